use carnet_db::Database;
use carnet_types::Role;

/// A small demo school: one admin, two real parents, one placeholder
/// parent, three students, one link per family. Link insertion order
/// matters for the first-link rules.
pub fn school() -> Database {
    let db = Database::open_in_memory().unwrap();
    let users: [(&str, Role, &str, &str, &str, Option<&str>); 7] = [
        ("admin", Role::Admin, "Nadia", "Benali", "direction@ecole.example", None),
        ("p-moreau", Role::Parent, "Claire", "Moreau", "claire.moreau@example.net", None),
        ("p-diallo", Role::Parent, "Amadou", "Diallo", "amadou.diallo@example.net", None),
        ("p-virtuel", Role::Parent, "Parent", "Virtuel", "parent.virtuel.lenoir@ecole.example", None),
        ("s-lina", Role::Student, "Lina", "Moreau", "lina.moreau@ecole.example", Some("1ere groupe 2")),
        ("s-theo", Role::Student, "Theo", "Diallo", "theo.diallo@ecole.example", Some("Terminale groupe 1")),
        ("s-emma", Role::Student, "Emma", "Lenoir", "emma.lenoir@ecole.example", Some("Seconde groupe 1")),
    ];
    for (id, role, first, last, email, class_level) in users {
        db.create_user(id, role, first, last, email, class_level).unwrap();
    }
    db.link_parent_student("p-moreau", "s-lina").unwrap();
    db.link_parent_student("p-diallo", "s-theo").unwrap();
    db.link_parent_student("p-virtuel", "s-emma").unwrap();
    db
}
