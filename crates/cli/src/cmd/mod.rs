mod files;
mod folders;
mod full_setup;
mod install;
mod nuget;
mod session;
mod status;
mod submodule;

pub use files::{cmd_config_files, cmd_license_files, cmd_scripts};
pub use folders::cmd_folders;
pub use full_setup::cmd_full_setup;
pub use install::{cmd_cancel, cmd_install, cmd_resume};
pub use nuget::cmd_nuget;
pub use session::Session;
pub use status::cmd_status;
pub use submodule::{cmd_analyzer, cmd_submodule};
