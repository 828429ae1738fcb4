// ABOUTME: Command modules for the formcoach CLI
// ABOUTME: One module per subcommand
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub mod analyze;
pub mod calibrate;
pub mod demo;
pub mod thresholds;
