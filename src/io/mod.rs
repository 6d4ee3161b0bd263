// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O operations for images, camera capture and report files.

pub mod camera;
pub mod media;
pub mod serialization;
