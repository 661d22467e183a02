use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Date, Duration, OffsetDateTime};

use finance_tracker::{Amount, Category, NewTransaction, Title, create_transaction, initialize_db};

/// A utility for creating a test database for the REST API server of finance_tracker.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// How many months of transactions to create, ending with the current month.
    #[arg(long, short, default_value_t = 6)]
    months: u8,
}

/// A recurring transaction, the day is clamped to the length of the month.
const MONTHLY_TRANSACTIONS: [(&str, f64, Category, u8, Option<&str>); 8] = [
    ("Salary", 4200.0, Category::Saving, 15, Some("Monthly pay")),
    ("Rent", 1650.0, Category::Need, 1, None),
    ("Groceries", 212.35, Category::Need, 6, Some("Grocery, weekly")),
    ("Power bill", 138.9, Category::Need, 20, None),
    ("Credit card repayment", 300.0, Category::Debt, 25, None),
    ("Phone plan", 45.0, Category::Expense, 9, None),
    ("Concert tickets", 89.5, Category::Want, 12, Some("Front row")),
    ("Takeaways", 32.8, Category::Want, 27, None),
];

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

    println!("Creating test transactions...");

    let today = OffsetDateTime::now_utc().date();
    let mut month_start = today.replace_day(1)?;
    let mut count = 0;

    for _ in 0..args.months {
        for (title, amount, category, day, notes) in MONTHLY_TRANSACTIONS {
            let date = clamp_day(month_start, day);

            if date > today {
                continue;
            }

            let transaction = NewTransaction::new(Title::new(title)?, Amount::new(amount)?, date, category)
                .notes(notes.map(str::to_owned));
            create_transaction(transaction, &conn)?;
            count += 1;
        }

        month_start = (month_start - Duration::days(1)).replace_day(1)?;
    }

    println!("Created {count} transactions. Success!");

    Ok(())
}

fn clamp_day(month_start: Date, day: u8) -> Date {
    let last_day = month_start.month().length(month_start.year());

    month_start.replace_day(day.min(last_day)).unwrap_or(month_start)
}
