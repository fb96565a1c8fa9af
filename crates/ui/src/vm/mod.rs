mod modal_vm;
pub mod progress_fmt;

pub use modal_vm::{ActiveModal, ExitRequestOutcome, ModalChoice, ModalOutcome, ModalVm, Navigator};
