//! Prints an Argon2 PHC string for seeding an admin row by hand:
//!
//! INSERT INTO app_user (email, password_hash, display_name, role)
//! VALUES ('admin@example.com', '<output>', 'Admin', 2);

use clinic_booking::auth::hash_password;

fn main() {
    let Some(password) = std::env::args().nth(1) else {
        eprintln!("Usage: hashpass <password>");
        std::process::exit(2);
    };
    match hash_password(&password) {
        Ok(phc) => println!("{phc}"),
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
