// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Data models for tracks, playback, and project state.

pub mod annotation;
pub mod playback;
pub mod project;
pub mod roster;
pub mod tracks;
