use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use fintrack_rs::TransactionType::{Expense, Income};
use fintrack_rs::{
    BankKind, CreditCardBillingConfig, Frequency, NewBank, NewBill, Transaction, create_bank,
    create_bill, create_category, create_transaction, create_user, initialize_db,
};

/// A utility for creating a test database for the REST API server of fintrack_rs.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test user...");
    let user = create_user("test", &conn)?;

    println!("Creating categories...");
    let groceries = create_category(user.id, "Groceries", &conn)?;
    let utilities = create_category(user.id, "Utilities", &conn)?;
    let salary = create_category(user.id, "Salary", &conn)?;

    println!("Creating bank accounts...");
    let everyday = create_bank(
        user.id,
        NewBank {
            name: "Everyday".to_owned(),
            kind: BankKind::Bank,
            billing: None,
        },
        &conn,
    )?;
    let visa = create_bank(
        user.id,
        NewBank {
            name: "Visa".to_owned(),
            kind: BankKind::CreditCard,
            billing: Some(CreditCardBillingConfig::new(25, 24, 5)?),
        },
        &conn,
    )?;

    let today = OffsetDateTime::now_utc().date();

    println!("Creating bills...");
    create_bill(
        user.id,
        NewBill {
            name: "Power".to_owned(),
            amount: 120.0,
            category_id: utilities.id,
            bank_id: Some(everyday.id),
            frequency: Frequency::Monthly,
            start_date: today - Duration::days(60),
            end_date: None,
        },
        &conn,
    )?;

    println!("Creating transactions...");
    let transactions = [
        (3200.0, Income, everyday.id, salary.id, 28, "Pay day"),
        (85.40, Expense, everyday.id, groceries.id, 21, "Supermarket"),
        (42.15, Expense, visa.id, groceries.id, 14, "Farmers market"),
        (3200.0, Income, everyday.id, salary.id, 0, "Pay day"),
        (97.80, Expense, visa.id, groceries.id, 0, "Supermarket"),
    ];

    for (amount, kind, bank_id, category_id, days_ago, description) in transactions {
        create_transaction(
            user.id,
            Transaction::build(
                amount,
                kind,
                bank_id,
                today - Duration::days(days_ago),
                description,
            )
            .category_id(Some(category_id)),
            &conn,
        )?;
    }

    println!("Success!");

    Ok(())
}
