// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Data model for images, verdicts and view state.

pub mod image;
pub mod report;
pub mod session;
pub mod verdict;
