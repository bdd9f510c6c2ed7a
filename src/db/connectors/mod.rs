// Database Connectors
// One connector per supported database family

pub mod mssql;
pub mod postgres;
pub mod sqlite;

pub use mssql::MssqlConnector;
pub use postgres::PostgresConnector;
pub use sqlite::SqliteConnector;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

/// Characters that cannot appear raw in the user or password part of a URL
const USERINFO: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b':')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'@')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Characters escaped in a path; `/` survives so file paths keep their shape
const PATH: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Same as [`PATH`] but for a single segment such as a database name
const PATH_SEGMENT: &AsciiSet = &PATH.add(b'/');

pub(crate) fn encode_userinfo(value: &str) -> String {
    utf8_percent_encode(value, USERINFO).to_string()
}

pub(crate) fn encode_path(value: &str) -> String {
    utf8_percent_encode(value, PATH).to_string()
}

pub(crate) fn encode_segment(value: &str) -> String {
    utf8_percent_encode(value, PATH_SEGMENT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_values_untouched() {
        assert_eq!(encode_userinfo("sa"), "sa");
        assert_eq!(encode_segment("sales_2024"), "sales_2024");
        assert_eq!(encode_path("/var/lib/app.db"), "/var/lib/app.db");
    }

    #[test]
    fn test_reserved_characters_escaped() {
        assert_eq!(encode_userinfo("p@ss:w/rd"), "p%40ss%3Aw%2Frd");
        assert_eq!(encode_segment("my db/x"), "my%20db%2Fx");
        assert_eq!(encode_path("/tmp/a b?.db"), "/tmp/a%20b%3F.db");
    }
}
