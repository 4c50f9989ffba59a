// SPDX-License-Identifier: MIT

pub mod error;
pub mod registry;
pub mod tool;
