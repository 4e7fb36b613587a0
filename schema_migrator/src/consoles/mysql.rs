//! MySQL console

use super::{segment, Console};
use crate::db::connection::ConnectionUri;
use crate::utils::shell;

/// Builds `mysql -h <host> -D <database>[ -P <port>][ -u <user>][ -p<password>]`.
///
/// The `mysql` client only reads an inline password when it is attached to
/// `-p`, so that segment has no space.
pub struct Mysql<'a> {
    uri: &'a ConnectionUri,
}

impl<'a> Mysql<'a> {
    pub fn new(uri: &'a ConnectionUri) -> Self {
        Self { uri }
    }
}

impl Console for Mysql<'_> {
    fn connection_string(&self) -> String {
        let port = self.uri.port().map(|port| port.to_string());

        let mut s = String::from("mysql");
        s.push_str(&segment("-h", Some(self.uri.host().unwrap_or_default())));
        s.push_str(&segment("-D", Some(&self.uri.database())));
        s.push_str(&segment("-P", port.as_deref()));
        s.push_str(&segment("-u", self.uri.user()));
        if let Some(password) = self.uri.password() {
            s.push_str(&format!(" -p{}", shell::escape(password)));
        }
        s
    }
}
