//! PostgreSQL console

use super::{segment, Console};
use crate::db::connection::ConnectionUri;

/// Builds `psql -h <host> -d <database>[ -p <port>][ -U <user>]`.
///
/// `psql` has no password flag; the password travels in `PGPASSWORD`.
pub struct Postgresql<'a> {
    uri: &'a ConnectionUri,
}

impl<'a> Postgresql<'a> {
    pub fn new(uri: &'a ConnectionUri) -> Self {
        Self { uri }
    }
}

impl Console for Postgresql<'_> {
    fn connection_string(&self) -> String {
        let port = self.uri.port().map(|port| port.to_string());

        let mut s = String::from("psql");
        s.push_str(&segment("-h", Some(self.uri.host().unwrap_or_default())));
        s.push_str(&segment("-d", Some(&self.uri.database())));
        s.push_str(&segment("-p", port.as_deref()));
        s.push_str(&segment("-U", self.uri.user()));
        s
    }

    fn envs(&self) -> Vec<(&'static str, String)> {
        self.uri
            .password()
            .map(|password| vec![("PGPASSWORD", password.to_string())])
            .unwrap_or_default()
    }
}
