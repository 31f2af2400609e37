//! `kin` — command-line client for a Kinship node.
//!
//! Every subcommand maps to one HTTP call against the node named by
//! `--node` (or `KINSHIP_NODE`):
//!
//! - **`show`**, **`register`** — inspect or create an account.
//! - **`follow`**, **`unfollow`**, **`accept`**, **`reject`** — drive the
//!   follow lifecycle.
//! - **`privacy`** — switch an account between public and private.
//! - **`following`**, **`followers`**, **`requests`**, **`relationship`** —
//!   read the follow graph.
//!
//! Exit status is 0 on success, 1 when the node rejects the request, and 2
//! when the node could not be reached or answered with something unreadable.

use std::process;

use clap::{ArgGroup, Parser, Subcommand};
use kinship_node_api::{
    Account, EdgeResponse, ErrorResponse, PrivacyRequest, PrivacyResponse, RegisterRequest,
    UserListResponse, UsernameBody,
};
use serde::{de::DeserializeOwned, Serialize};

/// kin — Kinship follow-graph CLI
#[derive(Parser)]
#[command(name = "kin", version, about, long_about = None)]
struct Cli {
    /// Base URL of the Kinship node.
    #[arg(long, env = "KINSHIP_NODE", default_value = "http://127.0.0.1:3000")]
    node: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print an account's privacy flag and relationship lists.
    Show { user: String },

    /// Register an account on a node that manages its own accounts.
    Register {
        user: String,
        /// Start out private.
        #[arg(long)]
        private: bool,
    },

    /// USER follows TARGET, or asks to if TARGET is private.
    Follow { user: String, target: String },

    /// USER stops following TARGET.
    Unfollow { user: String, target: String },

    /// USER accepts the pending request from REQUESTER.
    Accept { user: String, requester: String },

    /// USER rejects the pending request from REQUESTER.
    Reject { user: String, requester: String },

    /// Make an account private or public.
    ///
    /// Going public accepts every pending request.
    #[command(group(ArgGroup::new("mode").required(true).args(["private", "public"])))]
    Privacy {
        user: String,
        #[arg(long)]
        private: bool,
        #[arg(long)]
        public: bool,
    },

    /// List the accounts USER follows.
    Following { user: String },

    /// List the accounts following USER.
    Followers { user: String },

    /// List the requests waiting on USER's approval.
    Requests { user: String },

    /// Show the state of the edge FROM → TO.
    Relationship { from: String, to: String },
}

fn main() {
    let cli = Cli::parse();
    let node = Node::new(&cli.node);

    match cli.command {
        Command::Show { user } => {
            let acct: Account = node.get(&user_path(&user, &[]));
            print!("{}", render_account(&acct));
        }

        Command::Register { user, private } => {
            let acct: Account =
                node.send("PUT", &user_path(&user, &[]), &RegisterRequest { is_private: private });
            print!("{}", render_account(&acct));
        }

        Command::Follow { user, target } => node.edge(&user, "follow", &target),
        Command::Unfollow { user, target } => node.edge(&user, "unfollow", &target),
        Command::Accept { user, requester } => node.edge(&user, "accept", &requester),
        Command::Reject { user, requester } => node.edge(&user, "reject", &requester),

        Command::Privacy { user, private, .. } => {
            let resp: PrivacyResponse = node.send(
                "POST",
                &user_path(&user, &["privacy"]),
                &PrivacyRequest { is_private: private },
            );
            print!("{}", render_privacy(&resp));
            if !resp.failed.is_empty() {
                process::exit(1);
            }
        }

        Command::Following { user } => node.list(&user, "following"),
        Command::Followers { user } => node.list(&user, "followers"),
        Command::Requests { user } => node.list(&user, "requests"),

        Command::Relationship { from, to } => {
            let edge: EdgeResponse = node.get(&user_path(&from, &["relationship", to.as_str()]));
            println!("{}", render_edge(&edge));
        }
    }
}

// ---------------------------------------------------------------------------
// HTTP
// ---------------------------------------------------------------------------

struct Node {
    base: String,
    client: reqwest::blocking::Client,
}

impl Node {
    fn new(base: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
            client: reqwest::blocking::Client::new(),
        }
    }

    fn get<T: DeserializeOwned>(&self, path: &str) -> T {
        let resp = self
            .client
            .get(format!("{}{path}", self.base))
            .send()
            .unwrap_or_else(|e| fatal(&format!("request to {} failed: {e}", self.base)));
        read_body(resp)
    }

    fn send<B: Serialize, T: DeserializeOwned>(&self, method: &str, path: &str, body: &B) -> T {
        let url = format!("{}{path}", self.base);
        let req = match method {
            "PUT" => self.client.put(url),
            _ => self.client.post(url),
        };
        let resp = req
            .json(body)
            .send()
            .unwrap_or_else(|e| fatal(&format!("request to {} failed: {e}", self.base)));
        read_body(resp)
    }

    fn edge(&self, user: &str, verb: &str, other: &str) {
        let edge: EdgeResponse = self.send(
            "POST",
            &user_path(user, &[verb]),
            &UsernameBody::new(other),
        );
        println!("{}", render_edge(&edge));
    }

    fn list(&self, user: &str, which: &str) {
        let list: UserListResponse = self.get(&user_path(user, &[which]));
        for name in &list.items {
            println!("{name}");
        }
    }
}

/// `/users/{user}/{rest...}` with every segment percent-encoded, so names
/// containing `/`, `?` or `#` stay inside their own segment.
fn user_path(user: &str, rest: &[&str]) -> String {
    let mut path = format!("/users/{}", urlencoding::encode(user));
    for segment in rest {
        path.push('/');
        path.push_str(&urlencoding::encode(segment));
    }
    path
}

/// Decode a success body, or report the node's error and exit 1.
fn read_body<T: DeserializeOwned>(resp: reqwest::blocking::Response) -> T {
    let status = resp.status();
    let text = resp
        .text()
        .unwrap_or_else(|e| fatal(&format!("failed to read response: {e}")));

    if !status.is_success() {
        match serde_json::from_str::<ErrorResponse>(&text) {
            Ok(err) => {
                eprintln!("kin: {} ({})", err.error, err.code);
                if err.is_retryable() {
                    eprintln!("kin: the store is temporarily unavailable; try again");
                }
            }
            Err(_) => eprintln!("kin: node answered {status}"),
        }
        process::exit(1);
    }

    serde_json::from_str(&text)
        .unwrap_or_else(|e| fatal(&format!("unexpected response from node: {e}")))
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn render_edge(edge: &EdgeResponse) -> String {
    format!("{} -> {}: {}", edge.follower, edge.target, edge.state)
}

fn render_names(label: &str, names: &[String]) -> String {
    if names.is_empty() {
        format!("{label}: (none)\n")
    } else {
        format!("{label}: {}\n", names.join(", "))
    }
}

fn render_account(acct: &Account) -> String {
    let mode = if acct.is_private { "private" } else { "public" };
    let mut out = format!("{} ({mode})\n", acct.username);
    out.push_str(&render_names("following", &acct.following));
    out.push_str(&render_names("followers", &acct.followers));
    out.push_str(&render_names("requests", &acct.pending_requests));
    out
}

fn render_privacy(resp: &PrivacyResponse) -> String {
    let mut out = render_account(&resp.account);
    if !resp.drained.is_empty() {
        out.push_str(&render_names("accepted", &resp.drained));
    }
    for f in &resp.failed {
        out.push_str(&format!("not accepted: {} ({})\n", f.username, f.error));
    }
    out
}

/// Print an error message to stderr and exit with code 2.
fn fatal(msg: &str) -> ! {
    eprintln!("kin: {msg}");
    process::exit(2);
}
