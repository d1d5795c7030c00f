//! StarFive JH7110 相机子系统 (ISP / VIN) 控制核心
//!
//! `no_std` + `alloc`. 硬件协作者 (寄存器、时钟、缓冲队列等) 由宿主注入.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod drivers;
pub mod hal;
