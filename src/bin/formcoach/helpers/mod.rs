// ABOUTME: Helper modules for the formcoach CLI
// ABOUTME: Provides display formatting and session plumbing shared by commands
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub mod display;
pub mod runner;
