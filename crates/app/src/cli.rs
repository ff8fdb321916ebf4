//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "scm")]
#[command(about = "Smart Contact Manager session client")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset (e.g. "debug", "scm=trace")
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in with email and password
    Login {
        /// Account email
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long, env = "SCM_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Sign out and forget the stored session
    Logout,

    /// Show who is signed in
    Status,

    /// Complete a social sign-in from the URL the backend redirected to
    OauthCallback {
        /// Callback URL, e.g. "/oauth-success?token=..&email=..&name=.."
        url: String,
    },

    /// Open an application route, applying its access guard
    Open {
        /// Route path, e.g. "/user/contacts"
        path: String,
    },

    /// Show or edit the signed-in user's profile
    #[command(subcommand)]
    Profile(ProfileCommand),
}

#[derive(Debug, Subcommand)]
pub enum ProfileCommand {
    /// Fetch the profile from the backend
    Show,

    /// Change profile fields; omitted fields are kept
    Update(ProfileChanges),
}

#[derive(Debug, Default, Args)]
pub struct ProfileChanges {
    /// Display name
    #[arg(long)]
    pub name: Option<String>,

    /// About text
    #[arg(long)]
    pub about: Option<String>,

    /// Phone number
    #[arg(long = "phone")]
    pub phone_number: Option<String>,

    /// Profile picture URL
    #[arg(long)]
    pub profile_pic: Option<String>,
}

impl ProfileChanges {
    /// Returns true if no field was given.
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.about.is_none()
            && self.phone_number.is_none()
            && self.profile_pic.is_none()
    }
}
