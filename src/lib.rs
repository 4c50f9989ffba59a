// SPDX-License-Identifier: MIT

pub mod miner;
pub mod toolkit;
