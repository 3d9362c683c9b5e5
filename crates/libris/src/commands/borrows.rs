//! Borrows command - borrow and return books.

use anyhow::Result;
use clap::{Args, Subcommand, ValueEnum};
use console::Style;
use libris_client::{Borrow, BorrowFilter};

use super::Context;
use super::books::parse_isbn;
use crate::ui;

/// Arguments for the borrows command.
#[derive(Args, Debug)]
pub struct BorrowsArgs {
    #[command(subcommand)]
    pub command: BorrowsCommand,
}

#[derive(Subcommand, Debug)]
pub enum BorrowsCommand {
    /// Your borrows
    Mine {
        #[arg(short, long, value_enum, default_value = "active")]
        status: MineStatus,
    },

    /// Borrow one copy of a book
    Borrow {
        /// ISBN, hyphens allowed
        isbn: String,
    },

    /// Return a borrow by its id
    Return {
        /// Borrow id
        id: i64,
    },

    /// Return the book with this scanned ISBN
    ScanReturn {
        /// Scanned barcode
        code: String,
    },
}

/// Which of your borrows to list.
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum MineStatus {
    Active,
    Returned,
    All,
}

impl From<MineStatus> for BorrowFilter {
    fn from(status: MineStatus) -> Self {
        match status {
            MineStatus::Active => BorrowFilter::Active,
            MineStatus::Returned => BorrowFilter::Returned,
            MineStatus::All => BorrowFilter::All,
        }
    }
}

/// Run the borrows command.
pub async fn run(args: BorrowsArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let borrows = client.borrows();

    match args.command {
        BorrowsCommand::Mine { status } => {
            let list = borrows.mine(status.into()).await?;
            print_borrows("My Borrows", &list, ctx)
        }
        BorrowsCommand::Borrow { isbn } => {
            let isbn = parse_isbn(&isbn)?;
            let record = borrows.borrow(&isbn).await?;
            if ctx.json_output {
                return ctx.print_json(&record);
            }
            ui::success(format!(
                "Borrowed {} (#{}), due {}",
                record.book_title.as_deref().unwrap_or(&record.book_isbn),
                record.id,
                ui::date(&record.due_date)
            ));
            Ok(())
        }
        BorrowsCommand::Return { id } => {
            let record = borrows.return_book(id).await?;
            if ctx.json_output {
                return ctx.print_json(&record);
            }
            ui::success(format!("Returned borrow #{}", record.id));
            Ok(())
        }
        BorrowsCommand::ScanReturn { code } => {
            let isbn = parse_isbn(&code)?;
            match borrows.return_by_isbn(&isbn).await? {
                Some(record) if ctx.json_output => ctx.print_json(&record),
                Some(record) => {
                    ui::success(format!(
                        "Returned {}",
                        record.book_title.as_deref().unwrap_or(&record.book_isbn)
                    ));
                    Ok(())
                }
                None if ctx.json_output => ctx.print_json(&serde_json::Value::Null),
                None => {
                    ui::empty(&format!("You have no active borrow of {}", isbn));
                    Ok(())
                }
            }
        }
    }
}

pub(crate) fn print_borrows(title: &str, list: &[Borrow], ctx: &Context) -> Result<()> {
    if ctx.json_output {
        return ctx.print_json(list);
    }

    let dim = Style::new().dim();
    ui::heading(title);
    if list.is_empty() {
        ui::empty("No borrows");
        return Ok(());
    }
    for record in list {
        let state = if record.is_overdue {
            Style::new().red().apply_to("overdue")
        } else if record.is_active() {
            Style::new().yellow().apply_to("active")
        } else {
            Style::new().dim().apply_to("returned")
        };
        println!(
            "{} {} {} due {}",
            dim.apply_to(format!("#{:<5}", record.id)),
            ui::truncate(record.book_title.as_deref().unwrap_or(&record.book_isbn), 36),
            state,
            ui::date(&record.due_date)
        );
    }
    Ok(())
}
