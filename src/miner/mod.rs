// SPDX-License-Identifier: MIT

pub mod config;
pub mod credential;
pub mod gateway;
pub mod params;
pub mod server;
pub mod tools;
pub mod transport;
