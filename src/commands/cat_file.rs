use crate::areas::repository::Repository;
use crate::artifacts::objects::object::ObjectBox;
use crate::artifacts::objects::object_id::ObjectId;
use std::io::Write;

impl Repository {
    /// Pretty-print an object: blob content verbatim, tree entries as
    /// `mode type sha\tname` lines, commits in their text form
    pub fn cat_file(&self, sha: &str) -> anyhow::Result<()> {
        let oid = ObjectId::try_parse(sha)?;

        match self.database().parse_object(&oid)? {
            ObjectBox::Blob(blob) => {
                self.writer().write_all(blob.content())?;
            }
            ObjectBox::Tree(tree) => {
                for (name, entry) in tree.entries() {
                    let kind = if entry.is_tree() { "tree" } else { "blob" };
                    writeln!(
                        self.writer(),
                        "{} {} {}\t{}",
                        entry.mode.as_str(),
                        kind,
                        entry.oid.to_hex()?,
                        name
                    )?;
                }
            }
            ObjectBox::Commit(commit) => {
                writeln!(self.writer(), "tree {}", commit.tree_oid().to_hex()?)?;
                for parent in commit.parents() {
                    writeln!(self.writer(), "parent {}", parent.to_hex()?)?;
                }
                writeln!(self.writer(), "author {}", commit.author().display())?;
                writeln!(self.writer(), "committer {}", commit.committer().display())?;
                writeln!(self.writer())?;
                write!(self.writer(), "{}", commit.message())?;
            }
        }

        Ok(())
    }
}
