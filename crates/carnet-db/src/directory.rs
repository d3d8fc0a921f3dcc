//! Identity & relation directory: users, roles, class levels and
//! parent↔student links. Messaging treats these tables as read-only; the
//! provisioning helpers at the bottom exist for the seed binary and tests.

use crate::Database;
use crate::models::UserRow;
use anyhow::Result;
use rusqlite::OptionalExtension;
use carnet_types::Role;

/// Synthetic parent accounts are provisioned under a naming convention so
/// real staff can tell them apart; the admin never gets conversations or
/// recipients for them.
pub const PLACEHOLDER_EMAIL_PREFIX: &str = "parent.virtuel";
pub const PLACEHOLDER_FIRST_NAME: &str = "Parent";
pub const PLACEHOLDER_LAST_NAME: &str = "Virtuel";

const USER_COLUMNS: &str = "id, role, first_name, last_name, email, class_level, created_at";

impl Database {
    pub fn get_user(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"))?;
            let row = stmt.query_row([id], UserRow::from_row).optional()?;
            Ok(row)
        })
    }

    /// Parent ids linked to a student, in link-insertion order. "The parent"
    /// of a student means the first entry.
    pub fn parent_ids_of(&self, student_id: &str) -> Result<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT parent_id FROM parent_student_links
                 WHERE student_id = ?1 ORDER BY rowid",
            )?;
            let ids = stmt
                .query_map([student_id], |row| row.get(0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(ids)
        })
    }

    /// Student ids linked to a parent, in link-insertion order. "The child"
    /// of a parent means the first entry.
    pub fn student_ids_of(&self, parent_id: &str) -> Result<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT student_id FROM parent_student_links
                 WHERE parent_id = ?1 ORDER BY rowid",
            )?;
            let ids = stmt
                .query_map([parent_id], |row| row.get(0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(ids)
        })
    }

    /// The deployment assumes a single admin account; with several, the
    /// oldest row wins everywhere "the admin" is needed.
    pub fn first_admin(&self) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {USER_COLUMNS} FROM users WHERE role = 'admin' ORDER BY rowid LIMIT 1"
            ))?;
            let row = stmt.query_row([], UserRow::from_row).optional()?;
            Ok(row)
        })
    }

    /// Every real parent account, placeholder accounts excluded.
    pub fn active_parents(&self) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {USER_COLUMNS} FROM users
                 WHERE role = 'parent'
                   AND email NOT LIKE ?1 || '%'
                   AND NOT (first_name = ?2 AND last_name = ?3)
                 ORDER BY last_name, first_name"
            ))?;
            let rows = stmt
                .query_map(
                    [
                        PLACEHOLDER_EMAIL_PREFIX,
                        PLACEHOLDER_FIRST_NAME,
                        PLACEHOLDER_LAST_NAME,
                    ],
                    UserRow::from_row,
                )?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Provisioning (seed binary + tests only) --

    pub fn create_user(
        &self,
        id: &str,
        role: Role,
        first_name: &str,
        last_name: &str,
        email: &str,
        class_level: Option<&str>,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, role, first_name, last_name, email, class_level)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![id, role.as_str(), first_name, last_name, email, class_level],
            )?;
            Ok(())
        })
    }

    pub fn link_parent_student(&self, parent_id: &str, student_id: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO parent_student_links (parent_id, student_id) VALUES (?1, ?2)",
                [parent_id, student_id],
            )?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db_with_users() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.create_user("a1", Role::Admin, "Nadia", "Bensaid", "nadia@ecole.fr", None)
            .unwrap();
        db.create_user(
            "p1",
            Role::Parent,
            "Claire",
            "Moreau",
            "claire.moreau@example.fr",
            None,
        )
        .unwrap();
        db.create_user(
            "p2",
            Role::Parent,
            PLACEHOLDER_FIRST_NAME,
            PLACEHOLDER_LAST_NAME,
            "parent.virtuel+0042@ecole.fr",
            None,
        )
        .unwrap();
        db.create_user(
            "s1",
            Role::Student,
            "Lina",
            "Moreau",
            "lina.moreau@example.fr",
            Some("1ere groupe 2"),
        )
        .unwrap();
        db
    }

    #[test]
    fn active_parents_excludes_placeholders() {
        let db = db_with_users();
        let parents = db.active_parents().unwrap();
        assert_eq!(parents.len(), 1);
        assert_eq!(parents[0].id, "p1");
    }

    #[test]
    fn placeholder_detected_by_name_pair_alone() {
        let db = db_with_users();
        db.create_user(
            "p3",
            Role::Parent,
            PLACEHOLDER_FIRST_NAME,
            PLACEHOLDER_LAST_NAME,
            "someone@example.fr",
            None,
        )
        .unwrap();
        let ids: Vec<_> = db.active_parents().unwrap().into_iter().map(|u| u.id).collect();
        assert_eq!(ids, vec!["p1"]);
    }

    #[test]
    fn links_keep_insertion_order() {
        let db = db_with_users();
        db.create_user(
            "p4",
            Role::Parent,
            "Karim",
            "Diallo",
            "karim.diallo@example.fr",
            None,
        )
        .unwrap();
        db.link_parent_student("p1", "s1").unwrap();
        db.link_parent_student("p4", "s1").unwrap();
        assert_eq!(db.parent_ids_of("s1").unwrap(), vec!["p1", "p4"]);
    }

    #[test]
    fn first_admin_is_oldest_row() {
        let db = db_with_users();
        db.create_user("a2", Role::Admin, "Marc", "Petit", "marc@ecole.fr", None)
            .unwrap();
        assert_eq!(db.first_admin().unwrap().unwrap().id, "a1");
    }
}
