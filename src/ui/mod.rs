// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! UI components for the PazhamPazhutho application.

pub mod results;
pub mod upload;
