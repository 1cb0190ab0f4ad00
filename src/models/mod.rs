// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Region data model and the selection/editing state machine.

pub mod editor;
pub mod region;
pub mod selection;
