//! Git commit object
//!
//! Commits tie a tree snapshot to history: zero or more parents (the first
//! is the mainline), author and committer identities with timestamps, an
//! optional GPG signature, and the message.
//!
//! ## Format
//!
//! On disk:
//! ```text
//! commit <size>\0tree <tree-sha>
//! parent <parent-sha>
//! author <name> <email> <timestamp> <timezone>
//! committer <name> <email> <timestamp> <timezone>
//!
//! <commit message>
//! ```
//!
//! The timezone is emitted as `+0000` on write; parsed offsets are kept but
//! carry no further semantics.

use crate::artifacts::objects::object::Unpackable;
use crate::artifacts::objects::object::{Object, Packable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use bytes::Bytes;
use chrono::{DateTime, FixedOffset};
use std::io::{BufRead, Write};

/// Author or committer information
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Author {
    name: String,
    email: String,
    timestamp: DateTime<FixedOffset>,
}

impl Author {
    /// Create an author stamped with the current time
    pub fn new(name: String, email: String) -> Self {
        Author {
            name,
            email,
            timestamp: chrono::Utc::now().fixed_offset(),
        }
    }

    pub fn new_with_timestamp(
        name: String,
        email: String,
        timestamp: DateTime<FixedOffset>,
    ) -> Self {
        Author {
            name,
            email,
            timestamp,
        }
    }

    /// Header form: "Name <email> <unix-seconds> <timezone>"
    pub fn display(&self) -> String {
        format!(
            "{} <{}> {} {}",
            self.name,
            self.email,
            self.timestamp.timestamp(),
            self.timestamp.format("%z")
        )
    }

    /// "Name <email>" without the timestamp
    pub fn display_name(&self) -> String {
        format!("{} <{}>", self.name, self.email)
    }

    /// Log form, e.g. "Mon Jan 1 12:34:56 2024 +0000"
    pub fn readable_timestamp(&self) -> String {
        self.timestamp
            .format("%a %b %-d %H:%M:%S %Y %z")
            .to_string()
    }

    pub fn timestamp(&self) -> DateTime<FixedOffset> {
        self.timestamp
    }
}

impl TryFrom<&str> for Author {
    type Error = anyhow::Error;

    /// Parse "Name <email> <unix-seconds> <timezone>"
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        // split from the right: timezone, timestamp, then name/email
        let parts: Vec<&str> = value.rsplitn(3, ' ').collect();
        if parts.len() < 3 {
            return Err(anyhow::anyhow!("invalid author line: {value}"));
        }

        let timezone = parts[0];
        let timestamp = parts[1]
            .parse::<i64>()
            .map_err(|_| anyhow::anyhow!("invalid author timestamp: {}", parts[1]))?;
        let name_email = parts[2];

        let email_start = name_email
            .find('<')
            .ok_or_else(|| anyhow::anyhow!("invalid author line: missing '<'"))?;
        let email_end = name_email
            .find('>')
            .ok_or_else(|| anyhow::anyhow!("invalid author line: missing '>'"))?;

        let name = name_email[..email_start].trim().to_string();
        let email = name_email[email_start + 1..email_end].to_string();

        let offset = parse_timezone(timezone)?;
        let timestamp = DateTime::from_timestamp(timestamp, 0)
            .ok_or_else(|| anyhow::anyhow!("author timestamp out of range"))?
            .with_timezone(&offset);

        Ok(Author {
            name,
            email,
            timestamp,
        })
    }
}

/// Parse a "+HHMM" / "-HHMM" timezone into a fixed offset
fn parse_timezone(tz: &str) -> anyhow::Result<FixedOffset> {
    let bytes = tz.as_bytes();
    if bytes.len() != 5 || (bytes[0] != b'+' && bytes[0] != b'-') {
        return Err(anyhow::anyhow!("invalid timezone: {tz}"));
    }

    let hours: i32 = tz[1..3].parse()?;
    let minutes: i32 = tz[3..5].parse()?;
    let seconds = hours * 3600 + minutes * 60;

    let offset = if bytes[0] == b'+' {
        FixedOffset::east_opt(seconds)
    } else {
        FixedOffset::west_opt(seconds)
    };

    offset.ok_or_else(|| anyhow::anyhow!("timezone out of range: {tz}"))
}

/// Git commit object
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Commit {
    /// Parent commit ids; empty for the initial commit, first is mainline
    parents: Vec<ObjectId>,
    /// Tree object id for the directory snapshot
    tree_oid: ObjectId,
    author: Author,
    committer: Author,
    /// Raw GPG signature lines, without the "gpgsig " / continuation prefix
    sig_lines: Vec<String>,
    /// Commit message bytes
    message: String,
}

impl Commit {
    pub fn new(
        parents: Vec<ObjectId>,
        tree_oid: ObjectId,
        author: Author,
        committer: Author,
        message: String,
    ) -> Self {
        Commit {
            parents,
            tree_oid,
            author,
            committer,
            sig_lines: Vec::new(),
            message,
        }
    }

    /// First line of the message, for one-line display
    pub fn short_message(&self) -> String {
        self.message.lines().next().unwrap_or("").to_string()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn tree_oid(&self) -> &ObjectId {
        &self.tree_oid
    }

    pub fn parents(&self) -> &[ObjectId] {
        &self.parents
    }

    /// Mainline (first) parent
    pub fn parent(&self) -> Option<&ObjectId> {
        self.parents.first()
    }

    pub fn author(&self) -> &Author {
        &self.author
    }

    pub fn committer(&self) -> &Author {
        &self.committer
    }

    pub fn timestamp(&self) -> DateTime<FixedOffset> {
        self.author.timestamp()
    }
}

impl Packable for Commit {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut content = String::new();

        content.push_str(&format!("tree {}\n", self.tree_oid.to_hex()?));
        for parent in &self.parents {
            content.push_str(&format!("parent {}\n", parent.to_hex()?));
        }
        content.push_str(&format!("author {}\n", self.author.display()));
        content.push_str(&format!("committer {}\n", self.committer.display()));
        for (i, line) in self.sig_lines.iter().enumerate() {
            if i == 0 {
                content.push_str(&format!("gpgsig {line}\n"));
            } else {
                content.push_str(&format!(" {line}\n"));
            }
        }
        content.push('\n');
        content.push_str(&self.message);

        let mut commit_bytes = Vec::new();
        let header = format!("{} {}\0", self.object_type().as_str(), content.len());
        commit_bytes.write_all(header.as_bytes())?;
        commit_bytes.write_all(content.as_bytes())?;

        Ok(Bytes::from(commit_bytes))
    }
}

impl Unpackable for Commit {
    fn deserialize(reader: impl BufRead) -> anyhow::Result<Self> {
        let content = reader
            .bytes()
            .collect::<Result<Vec<u8>, std::io::Error>>()?;
        let content = String::from_utf8(content)?;

        let (headers, message) = content
            .split_once("\n\n")
            .context("invalid commit object: missing header separator")?;

        let mut tree_oid = None;
        let mut parents = Vec::new();
        let mut author = None;
        let mut committer = None;
        let mut sig_lines: Vec<String> = Vec::new();
        let mut in_gpgsig = false;

        for line in headers.lines() {
            if in_gpgsig {
                if let Some(continuation) = line.strip_prefix(' ') {
                    sig_lines.push(continuation.to_string());
                    continue;
                }
                in_gpgsig = false;
            }

            let (field, value) = line
                .split_once(' ')
                .context("invalid commit object: malformed header line")?;

            match field {
                "tree" => tree_oid = Some(ObjectId::try_parse(value)?),
                "parent" => parents.push(ObjectId::try_parse(value)?),
                "author" => author = Some(Author::try_from(value)?),
                "committer" => committer = Some(Author::try_from(value)?),
                "gpgsig" => {
                    sig_lines.push(value.to_string());
                    in_gpgsig = true;
                }
                _ => {
                    return Err(anyhow::anyhow!(
                        "invalid commit object: unknown header '{field}'"
                    ));
                }
            }
        }

        let tree_oid = tree_oid.context("invalid commit object: missing tree line")?;
        let author = author.context("invalid commit object: missing author line")?;
        let committer = committer.context("invalid commit object: missing committer line")?;

        Ok(Commit {
            parents,
            tree_oid,
            author,
            committer,
            sig_lines,
            message: message.to_string(),
        })
    }
}

impl Object for Commit {
    fn object_type(&self) -> ObjectType {
        ObjectType::Commit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};
    use std::io::Cursor;

    #[fixture]
    fn author() -> Author {
        let timestamp = DateTime::parse_from_rfc3339("2024-01-01T12:34:56+00:00").unwrap();
        Author::new_with_timestamp(
            "tester".to_string(),
            "tester@test.com".to_string(),
            timestamp,
        )
    }

    #[fixture]
    fn tree_oid() -> ObjectId {
        ObjectId::try_parse("aa5df04587d4c35e4a1a0291b51b5a0b24d5b1c7").unwrap()
    }

    #[rstest]
    fn test_author_display_round_trip(author: Author) {
        let line = author.display();
        assert_eq!(line, "tester <tester@test.com> 1704112496 +0000");

        let parsed = Author::try_from(line.as_str()).unwrap();
        assert_eq!(parsed, author);
    }

    #[rstest]
    #[case("+0530")]
    #[case("-0800")]
    fn test_author_keeps_timezone(#[case] tz: &str, author: Author) {
        let line = format!(
            "{} <{}> 1704112496 {tz}",
            "tester", "tester@test.com"
        );

        let parsed = Author::try_from(line.as_str()).unwrap();
        assert_eq!(parsed.display(), line);
        // same instant regardless of offset
        assert_eq!(parsed.timestamp().timestamp(), author.timestamp().timestamp());
    }

    #[rstest]
    fn test_serialize_initial_commit(author: Author, tree_oid: ObjectId) {
        let commit = Commit::new(
            Vec::new(),
            tree_oid,
            author.clone(),
            author,
            "first\n".to_string(),
        );

        let bytes = commit.serialize().unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();

        let expected_body = "tree aa5df04587d4c35e4a1a0291b51b5a0b24d5b1c7\n\
             author tester <tester@test.com> 1704112496 +0000\n\
             committer tester <tester@test.com> 1704112496 +0000\n\
             \n\
             first\n";
        assert_eq!(text, format!("commit {}\0{}", expected_body.len(), expected_body));
    }

    #[rstest]
    fn test_deserialize_round_trip(author: Author, tree_oid: ObjectId) {
        let parent = ObjectId::from_raw([3u8; 20]);
        let commit = Commit::new(
            vec![parent],
            tree_oid,
            author.clone(),
            author,
            "subject\n\nbody line\n".to_string(),
        );

        let bytes = commit.serialize().unwrap();
        let mut reader = Cursor::new(bytes);
        ObjectType::parse_object_type(&mut reader).unwrap();

        let parsed = Commit::deserialize(reader).unwrap();
        assert_eq!(parsed, commit);
        assert_eq!(parsed.short_message(), "subject");
        assert_eq!(parsed.parent(), Some(&parent));
    }

    #[rstest]
    fn test_deserialize_gpg_signed_commit(author: Author, tree_oid: ObjectId) {
        let body = format!(
            "tree {}\n\
             author {}\n\
             committer {}\n\
             gpgsig -----BEGIN PGP SIGNATURE-----\n\
             \x20line-one\n\
             \x20-----END PGP SIGNATURE-----\n\
             \n\
             signed\n",
            tree_oid.to_hex().unwrap(),
            author.display(),
            author.display(),
        );

        let parsed = Commit::deserialize(Cursor::new(body.into_bytes())).unwrap();
        assert_eq!(parsed.message(), "signed\n");
        assert_eq!(parsed.sig_lines.len(), 3);

        // the signature survives a serialize cycle byte-for-byte
        let bytes = parsed.serialize().unwrap();
        let mut reader = Cursor::new(bytes);
        ObjectType::parse_object_type(&mut reader).unwrap();
        let reparsed = Commit::deserialize(reader).unwrap();
        assert_eq!(reparsed, parsed);
    }

    #[rstest]
    fn test_rejects_commit_without_tree(author: Author) {
        let body = format!("author {}\ncommitter {}\n\nmsg\n", author.display(), author.display());

        assert!(Commit::deserialize(Cursor::new(body.into_bytes())).is_err());
    }
}
