//! Settings for one invocation: where the transport endpoint lives, how big
//! a reply may be, and how to display it.

use std::path::PathBuf;

/// ------------------------------------------------------------
/// Defaults
/// ------------------------------------------------------------
pub const DEFAULT_SOCKET_DIR: &str = "/tmp";
/// File name of the stream endpoint inside the socket directory.
pub const STREAM_SOCKET_NAME: &str = "chaos_stream";
/// Largest data portion of a Chaosnet packet.
pub const CH_PK_MAXLEN: usize = 488;
pub const DEFAULT_CONTACT: &str = "STATUS";

/// How the payload of a reply is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayMode {
    /// Decode recognized services, dump everything else.
    #[default]
    Decoded,
    /// Decode recognized services, print everything else as text.
    Ascii,
    /// Dump the bytes whatever the service.
    Raw,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub socket_dir: PathBuf,
    pub max_record_size: usize,
    pub display: DisplayMode,
    /// Forwarded to the endpoint in the request line; never enforced here.
    pub timeout: Option<u32>,
    pub verbose: bool,
    pub quiet: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            socket_dir: PathBuf::from(DEFAULT_SOCKET_DIR),
            max_record_size: CH_PK_MAXLEN,
            display: DisplayMode::default(),
            timeout: None,
            verbose: false,
            quiet: false,
        }
    }
}

impl Config {
    /// Full path of the stream endpoint.
    pub fn stream_socket_path(&self) -> PathBuf {
        self.socket_dir.join(STREAM_SOCKET_NAME)
    }
}
