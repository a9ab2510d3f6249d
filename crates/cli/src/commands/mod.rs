pub mod archive;
pub mod init;
pub mod run;
