// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O operations for recordings and config files.

pub mod export;
pub mod serialization;
