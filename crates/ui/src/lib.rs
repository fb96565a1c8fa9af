#![forbid(unsafe_code)]

pub mod vm;

pub use vm::{
    ActiveModal, ExitRequestOutcome, ModalChoice, ModalOutcome, ModalVm, Navigator,
};
