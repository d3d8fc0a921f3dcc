//! Dev-only directory provisioning.
//!
//! In production the identity directory is owned by the account-provisioning
//! service; this binary stands in for it locally. It fills the database with
//! a small demo school and prints a ready-to-use bearer token per account.
//!
//! Usage: `cargo run --bin seed` (honors CARNET_DB_PATH / CARNET_JWT_SECRET).

use std::path::PathBuf;

use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use carnet_db::Database;
use carnet_types::{Claims, Role};

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().init();

    let jwt_secret =
        std::env::var("CARNET_JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into());
    let db_path = std::env::var("CARNET_DB_PATH").unwrap_or_else(|_| "carnet.db".into());

    let db = Database::open(&PathBuf::from(&db_path))?;

    let users: &[(Role, &str, &str, &str, Option<&str>)] = &[
        (Role::Admin, "Nadia", "Benali", "direction@ecole.example", None),
        (Role::Parent, "Claire", "Moreau", "claire.moreau@example.net", None),
        (Role::Parent, "Amadou", "Diallo", "amadou.diallo@example.net", None),
        // Placeholder account: satisfies the every-student-has-a-parent
        // invariant, invisible to the admin.
        (Role::Parent, "Parent", "Virtuel", "parent.virtuel.lenoir@ecole.example", None),
        (Role::Student, "Lina", "Moreau", "lina.moreau@ecole.example", Some("1ere groupe 2")),
        (Role::Student, "Theo", "Diallo", "theo.diallo@ecole.example", Some("Terminale groupe 1")),
        (Role::Student, "Emma", "Lenoir", "emma.lenoir@ecole.example", Some("Seconde groupe 1")),
    ];

    let mut ids = Vec::new();
    for (role, first, last, email, class_level) in users {
        let id = Uuid::new_v4();
        db.create_user(&id.to_string(), *role, first, last, email, *class_level)?;
        ids.push((id, *role, format!("{first} {last}")));
    }

    // One link per family; insertion order is the first-parent order.
    for (parent_idx, student_idx) in [(1usize, 4usize), (2, 5), (3, 6)] {
        db.link_parent_student(&ids[parent_idx].0.to_string(), &ids[student_idx].0.to_string())?;
    }

    println!("Seeded {} accounts into {}\n", ids.len(), db_path);
    for (id, role, name) in &ids {
        let claims = Claims {
            sub: *id,
            role: *role,
            exp: (chrono::Utc::now() + chrono::Duration::days(30)).timestamp() as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(jwt_secret.as_bytes()),
        )?;
        println!("{role:<8} {name:<16} id={id}");
        println!("         Bearer {token}\n");
    }

    Ok(())
}
