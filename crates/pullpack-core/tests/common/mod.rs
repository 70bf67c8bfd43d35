#![allow(dead_code)]

pub mod archives;
pub mod http_server;
