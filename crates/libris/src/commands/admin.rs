//! Admin command - the administrative console.

use anyhow::{Result, bail};
use clap::{Args, Subcommand, ValueEnum};
use console::{Style, style};
use libris_client::{
    AdminUser, Book, BookFilter, BookUpdate, BorrowFilter, ExportKind, ListBooksQuery,
    ListUsersQuery, Paginator, UserFilter, parse_tags, rank_overdue,
};
use serde_json::json;

use super::books::parse_isbn;
use super::borrows::print_borrows;
use super::{Context, load_pages};
use crate::ui;

/// Arguments for the admin command.
#[derive(Args, Debug)]
pub struct AdminArgs {
    #[command(subcommand)]
    pub command: AdminCommand,
}

#[derive(Subcommand, Debug)]
pub enum AdminCommand {
    /// Dashboard counters and latest activity
    Stats {
        /// Activity lines to show
        #[arg(short, long, default_value = "5")]
        activities: u32,
    },

    /// List the catalogue
    Books {
        /// Match title or ISBN
        #[arg(short, long)]
        keyword: Option<String>,

        #[arg(short, long, value_enum, default_value = "all")]
        filter: StockFilter,

        #[command(flatten)]
        paging: Paging,
    },

    /// List users
    Users {
        /// Match nickname or user id
        #[arg(short, long)]
        keyword: Option<String>,

        #[arg(short, long, value_enum, default_value = "all")]
        filter: UserKind,

        #[command(flatten)]
        paging: Paging,
    },

    /// List borrows in one state
    Borrows {
        #[arg(short, long, value_enum, default_value = "active")]
        status: AdminBorrowStatus,
    },

    /// Overdue borrows, most overdue first
    Overdue,

    /// Who has borrowed a book
    History {
        /// ISBN, hyphens allowed
        isbn: String,
    },

    /// Borrow records of one user
    UserBorrows {
        user_id: i64,
    },

    /// Send a return reminder for one borrow
    Remind {
        borrow_id: i64,
    },

    /// Remind every overdue borrower
    BatchRemind,

    /// Mark a borrow returned on the borrower's behalf
    ForceReturn {
        borrow_id: i64,
    },

    /// Get a download link for an export
    Export {
        #[arg(value_enum)]
        kind: ExportArg,
    },

    /// Change catalogue fields of a book
    EditBook {
        /// ISBN, hyphens allowed
        isbn: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        author: Option<String>,

        #[arg(long)]
        publisher: Option<String>,

        #[arg(long)]
        summary: Option<String>,

        /// Tags, separated by spaces or commas
        #[arg(long)]
        tags: Option<String>,
    },

    /// Set the on-shelf stock of a book
    SetStock {
        /// ISBN, hyphens allowed
        isbn: String,
        stock: i64,
    },

    /// Delete a book (refused while copies are on loan)
    DeleteBook {
        /// ISBN, hyphens allowed
        isbn: String,
    },

    /// Grant admin rights, or revoke them with --revoke
    SetAdmin {
        user_id: i64,

        #[arg(long)]
        revoke: bool,
    },

    /// Disable an account
    Ban {
        user_id: i64,
    },
}

/// Page size and whether to keep loading.
#[derive(Args, Debug, Clone, Copy)]
pub struct Paging {
    /// Items per page
    #[arg(short, long, default_value = "20")]
    pub limit: u32,

    /// Load every page, not just the first
    #[arg(long)]
    pub all: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum StockFilter {
    All,
    /// One or two copies left
    Low,
    /// Out of stock
    Zero,
}

impl From<StockFilter> for BookFilter {
    fn from(filter: StockFilter) -> Self {
        match filter {
            StockFilter::All => BookFilter::All,
            StockFilter::Low => BookFilter::Low,
            StockFilter::Zero => BookFilter::Zero,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum UserKind {
    All,
    Admin,
    /// Joined in the last week
    Recent,
}

impl From<UserKind> for UserFilter {
    fn from(kind: UserKind) -> Self {
        match kind {
            UserKind::All => UserFilter::All,
            UserKind::Admin => UserFilter::Admin,
            UserKind::Recent => UserFilter::Recent,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum AdminBorrowStatus {
    Active,
    Returned,
    Overdue,
}

impl From<AdminBorrowStatus> for BorrowFilter {
    fn from(status: AdminBorrowStatus) -> Self {
        match status {
            AdminBorrowStatus::Active => BorrowFilter::Active,
            AdminBorrowStatus::Returned => BorrowFilter::Returned,
            AdminBorrowStatus::Overdue => BorrowFilter::Overdue,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ExportArg {
    Books,
    Borrows,
    Overdue,
}

impl From<ExportArg> for ExportKind {
    fn from(kind: ExportArg) -> Self {
        match kind {
            ExportArg::Books => ExportKind::Books,
            ExportArg::Borrows => ExportKind::Borrows,
            ExportArg::Overdue => ExportKind::Overdue,
        }
    }
}

/// Run the admin command.
pub async fn run(args: AdminArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let admin = client.admin();
    let dim = Style::new().dim();

    match args.command {
        AdminCommand::Stats { activities } => {
            let stats = admin.stats().await?;
            let counts = admin.borrow_counts().await?;
            let recent = admin.activities(activities).await?;
            if ctx.json_output {
                return ctx.print_json(&json!({
                    "stats": stats,
                    "borrow_counts": counts,
                    "activities": recent,
                }));
            }

            ui::heading("Dashboard");
            println!(
                "{:<16} {} (+{} today)",
                "Books", stats.total_books, stats.new_books_today
            );
            println!(
                "{:<16} {} (+{} today)",
                "Users", stats.total_users, stats.new_users_today
            );
            println!(
                "{:<16} {} ({} today)",
                "On loan", stats.active_borrows, stats.today_borrows
            );
            println!("{:<16} {}", "Overdue", style(stats.overdue_count).red());
            println!("{:<16} {}", "Returned", counts.returned);
            if !recent.is_empty() {
                println!();
                ui::heading("Recent Activity");
                for line in &recent {
                    println!("{} {}", dim.apply_to(&line.time), line.content);
                }
            }
            Ok(())
        }

        AdminCommand::Books {
            keyword,
            filter,
            paging,
        } => {
            let query = ListBooksQuery {
                keyword,
                filter: filter.into(),
            };
            let pager: Paginator<Book> = Paginator::new(paging.limit);
            let (admin, query) = (&admin, &query);
            load_pages(&pager, paging.all, move |page, limit| async move {
                admin.books(query, page, limit).await.map(|p| p.items)
            })
            .await?;

            let books = pager.items();
            if ctx.json_output {
                return ctx.print_json(&books);
            }
            ui::heading("Catalogue");
            if books.is_empty() {
                ui::empty("No books found");
            }
            for book in &books {
                let stock = format!("{}/{}", book.stock, book.total);
                let stock = if book.stock == 0 {
                    Style::new().red().apply_to(stock)
                } else {
                    Style::new().apply_to(stock)
                };
                println!(
                    "{} {} {}",
                    dim.apply_to(&book.isbn),
                    ui::truncate(&book.title, 40),
                    stock
                );
            }
            more_hint(&pager);
            Ok(())
        }

        AdminCommand::Users {
            keyword,
            filter,
            paging,
        } => {
            let query = ListUsersQuery {
                keyword,
                filter: filter.into(),
            };
            let pager: Paginator<AdminUser> = Paginator::new(paging.limit);
            let (admin, query) = (&admin, &query);
            load_pages(&pager, paging.all, move |page, limit| async move {
                admin.users(query, page, limit).await.map(|p| p.items)
            })
            .await?;

            let users = pager.items();
            if ctx.json_output {
                return ctx.print_json(&users);
            }
            ui::heading("Users");
            if users.is_empty() {
                ui::empty("No users found");
            }
            for user in &users {
                let name = user.nickname.as_deref().unwrap_or("(no nickname)");
                let badge = if user.is_admin {
                    style(" admin").cyan().to_string()
                } else {
                    String::new()
                };
                println!(
                    "{} {}{} {}",
                    dim.apply_to(format!("#{:<5}", user.id)),
                    name,
                    badge,
                    dim.apply_to(format!(
                        "{} borrowed, {} out",
                        user.total_borrows, user.current_borrows
                    ))
                );
            }
            more_hint(&pager);
            Ok(())
        }

        AdminCommand::Borrows { status } => {
            let list = admin.borrows(status.into()).await?;
            print_borrows("Borrows", &list, ctx)
        }

        AdminCommand::Overdue => {
            let list = client.borrows().overdue().await?;
            let ranked = rank_overdue(list, chrono::Local::now().naive_local());
            if ctx.json_output {
                return ctx.print_json(&ranked);
            }
            ui::heading("Overdue");
            if ranked.is_empty() {
                ui::empty("Nothing is overdue");
            }
            for entry in &ranked {
                let record = &entry.borrow;
                println!(
                    "{} {} {} {}",
                    dim.apply_to(format!("#{:<5}", record.id)),
                    ui::truncate(record.book_title.as_deref().unwrap_or(&record.book_isbn), 36),
                    dim.apply_to(format!("user {}", record.user_id)),
                    style(format!("{} days", entry.overdue_days)).red()
                );
            }
            Ok(())
        }

        AdminCommand::History { isbn } => {
            let isbn = parse_isbn(&isbn)?;
            let history = admin.book_history(&isbn).await?;
            if ctx.json_output {
                return ctx.print_json(&history);
            }
            ui::heading(&format!("History of {}", isbn));
            if history.is_empty() {
                ui::empty("Never borrowed");
            }
            for entry in &history {
                println!(
                    "{} {} {} → {}",
                    dim.apply_to(format!("#{:<5}", entry.id)),
                    entry
                        .user_nickname
                        .clone()
                        .unwrap_or_else(|| format!("user {}", entry.user_id)),
                    ui::date(&entry.borrowed_at),
                    entry.returned_at.as_deref().map(ui::date).unwrap_or("on loan")
                );
            }
            Ok(())
        }

        AdminCommand::UserBorrows { user_id } => {
            let borrows = admin.user_borrows(user_id).await?;
            if ctx.json_output {
                return ctx.print_json(&borrows);
            }
            ui::heading(&format!("Borrows of user {}", user_id));
            println!(
                "{}",
                dim.apply_to(format!(
                    "{} total, {} active, {} returned",
                    borrows.stats.total, borrows.stats.active, borrows.stats.returned
                ))
            );
            for record in &borrows.records {
                println!(
                    "{} {} {:?}",
                    dim.apply_to(format!("#{:<5}", record.id)),
                    ui::truncate(record.book_title.as_deref().unwrap_or(&record.book_isbn), 36),
                    record.status
                );
            }
            Ok(())
        }

        AdminCommand::Remind { borrow_id } => {
            let result = admin.remind(borrow_id).await?;
            if ctx.json_output {
                return ctx.print_json(&result);
            }
            if result.sent {
                ui::success(format!("Reminder sent for borrow #{}", borrow_id));
            } else {
                ui::empty("Reminder recorded but not delivered");
            }
            Ok(())
        }

        AdminCommand::BatchRemind => {
            let response = admin.batch_remind().await?;
            if ctx.json_output {
                return ctx.print_json(&response);
            }
            ui::success(&response.message);
            Ok(())
        }

        AdminCommand::ForceReturn { borrow_id } => {
            let response = admin.force_return(borrow_id).await?;
            if ctx.json_output {
                return ctx.print_json(&response);
            }
            ui::success(format!("Borrow #{} marked returned", borrow_id));
            Ok(())
        }

        AdminCommand::Export { kind } => {
            let link = admin.export(kind.into()).await?;
            if ctx.json_output {
                return ctx.print_json(&link);
            }
            println!("{}", link.download_url);
            Ok(())
        }

        AdminCommand::EditBook {
            isbn,
            title,
            author,
            publisher,
            summary,
            tags,
        } => {
            let isbn = parse_isbn(&isbn)?;
            let update = BookUpdate {
                title,
                author,
                publisher,
                summary,
                tags: tags.as_deref().map(parse_tags),
                ..Default::default()
            };
            if update.is_empty() {
                bail!("nothing to change; pass at least one field");
            }
            let response = admin.update_book(&isbn, &update).await?;
            if ctx.json_output {
                return ctx.print_json(&response);
            }
            ui::success(format!("Updated {}", isbn));
            Ok(())
        }

        AdminCommand::SetStock { isbn, stock } => {
            if stock < 0 {
                bail!("stock cannot be negative");
            }
            let isbn = parse_isbn(&isbn)?;
            let level = admin.set_stock(&isbn, stock).await?;
            if ctx.json_output {
                return ctx.print_json(&level);
            }
            ui::success(format!("Stock of {} is now {}/{}", isbn, level.stock, level.total));
            Ok(())
        }

        AdminCommand::DeleteBook { isbn } => {
            let isbn = parse_isbn(&isbn)?;
            let response = admin.delete_book(&isbn).await?;
            if ctx.json_output {
                return ctx.print_json(&response);
            }
            ui::success(format!("Deleted {}", isbn));
            Ok(())
        }

        AdminCommand::SetAdmin { user_id, revoke } => {
            let flag = admin.set_admin(user_id, !revoke).await?;
            if ctx.json_output {
                return ctx.print_json(&flag);
            }
            if flag.is_admin {
                ui::success(format!("User {} is now an admin", user_id));
            } else {
                ui::success(format!("User {} is no longer an admin", user_id));
            }
            Ok(())
        }

        AdminCommand::Ban { user_id } => {
            let response = admin.ban_user(user_id).await?;
            if ctx.json_output {
                return ctx.print_json(&response);
            }
            ui::success(format!("User {} banned", user_id));
            Ok(())
        }
    }
}

fn more_hint<T>(pager: &Paginator<T>) {
    if pager.has_more() {
        let dim = Style::new().dim();
        println!();
        println!(
            "{}",
            dim.apply_to(format!(
                "Showing {} so far. Pass --all to load every page.",
                pager.len()
            ))
        );
    }
}
