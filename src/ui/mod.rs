// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! UI components for the review application.

pub mod assignment;
pub mod home;
pub mod player;
pub mod transport;
