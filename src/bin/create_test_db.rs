use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime, format_description::well_known::Rfc3339};

use tillbook::{
    CategoryKind, LineItem, NewCategory, NewFinanceTransaction, NewSale, NewWallet, RecordKind,
    RecordStatus, WalletKind, create_category, create_finance_transaction, create_sale,
    create_wallet, initialize_db,
};

/// A utility for creating a test database for the tillbook server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// How many days of history to generate, counting back from today.
    #[arg(long, default_value_t = 400)]
    days: i64,
}

const PRODUCTS: [(&str, f64); 6] = [
    ("Espresso", 6.5),
    ("Cappuccino", 9.0),
    ("Cheese Bread", 4.5),
    ("Croissant", 8.0),
    ("Orange Juice", 10.0),
    ("Carrot Cake", 12.0),
];

const PAYMENT_METHODS: [&str; 4] = ["money", "pix", "credit", "debit"];

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

    println!("Creating categories and wallets...");
    let drinks = create_category(
        NewCategory::new("Drinks", CategoryKind::Income, "#2563eb", "cup"),
        &conn,
    )?;
    let bakery = create_category(
        NewCategory::new("Bakery", CategoryKind::Income, "#f59e0b", "bread"),
        &conn,
    )?;
    let rent = create_category(
        NewCategory::new("Rent", CategoryKind::Expense, "#dc2626", "home"),
        &conn,
    )?;
    let supplies = create_category(
        NewCategory::new("Supplies", CategoryKind::Expense, "#9333ea", "box"),
        &conn,
    )?;

    let till = create_wallet(
        NewWallet::new("Till", WalletKind::Cash, 350.0, "#16a34a"),
        &conn,
    )?;
    let bank = create_wallet(
        NewWallet::new("Business Account", WalletKind::Bank, 12_500.0, "#2563eb"),
        &conn,
    )?;
    create_wallet(
        NewWallet::new("Company Card", WalletKind::CreditCard, -820.0, "#0f172a"),
        &conn,
    )?;

    println!("Creating sales for the last {} days...", args.days);
    let now = OffsetDateTime::now_utc();
    let mut sale_count = 0;

    for day in 0..args.days {
        let date = now - Duration::days(day);
        let sales_today = 3 + (day % 5);

        for n in 0..sales_today {
            let created_at = (date - Duration::minutes(47 * n)).format(&Rfc3339)?;
            let (first_name, first_price) = PRODUCTS[((day + n) % 6) as usize];
            let (second_name, second_price) = PRODUCTS[((day * 3 + n) % 6) as usize];
            let quantity = 1 + (n % 3) as u32;
            let total = first_price * f64::from(quantity) + second_price;

            let mut sale = NewSale::build(total, &created_at)
                .category_id(Some(if n % 2 == 0 { drinks.id } else { bakery.id }))
                .wallet_id(Some(till.id))
                .line_item(LineItem::new(first_name, quantity, first_price))
                .line_item(LineItem::new(second_name, 1, second_price));

            // Every fourth sale is split across two payment methods.
            sale = if n % 4 == 3 {
                let cash_part = (total / 2.0).floor();
                sale.payment("money", cash_part)
                    .payment("pix", total - cash_part)
            } else {
                sale.payment(PAYMENT_METHODS[((day + n) % 4) as usize], total)
            };

            if day % 17 == 0 && n == 0 {
                sale = sale.status(RecordStatus::Cancelled);
            }

            create_sale(&sale, &conn)?;
            sale_count += 1;
        }
    }

    println!("Creating income and expenses...");
    let months = args.days / 30 + 1;
    for month in 0..months {
        let occurred_at = (now - Duration::days(30 * month)).format(&Rfc3339)?;

        create_finance_transaction(
            &NewFinanceTransaction::build(RecordKind::Expense, 2_800.0, &occurred_at)
                .category_id(Some(rent.id))
                .wallet_id(Some(bank.id)),
            &conn,
        )?;
        create_finance_transaction(
            &NewFinanceTransaction::build(
                RecordKind::Expense,
                600.0 + 45.0 * (month % 4) as f64,
                &occurred_at,
            )
            .category_id(Some(supplies.id))
            .wallet_id(Some(bank.id)),
            &conn,
        )?;
        create_finance_transaction(
            &NewFinanceTransaction::build(RecordKind::Income, 150.0, &occurred_at)
                .wallet_id(Some(bank.id)),
            &conn,
        )?;
        create_finance_transaction(
            &NewFinanceTransaction::build(RecordKind::Transfer, 1_000.0, &occurred_at),
            &conn,
        )?;
    }

    let next_week = (now + Duration::days(7)).format(&Rfc3339)?;
    create_finance_transaction(
        &NewFinanceTransaction::build(RecordKind::Expense, 2_800.0, &next_week)
            .status(RecordStatus::Pending)
            .category_id(Some(rent.id))
            .wallet_id(Some(bank.id)),
        &conn,
    )?;
    create_finance_transaction(
        &NewFinanceTransaction::build(RecordKind::Income, 480.0, &next_week)
            .status(RecordStatus::Pending)
            .wallet_id(Some(bank.id)),
        &conn,
    )?;

    println!("Created {sale_count} sales and {months} months of finance records.");
    println!("Success!");

    Ok(())
}
