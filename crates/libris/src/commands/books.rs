//! Books command - browse and add books.

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use console::Style;
use libris_client::{Book, BookSummary, NewBook, normalize_isbn, parse_tags};

use super::Context;
use crate::ui;

/// Arguments for the books command.
#[derive(Args, Debug)]
pub struct BooksArgs {
    #[command(subcommand)]
    pub command: BooksCommand,
}

#[derive(Subcommand, Debug)]
pub enum BooksCommand {
    /// Recently added books
    Recent {
        /// Maximum books to show
        #[arg(short, long, default_value = "10")]
        limit: u32,
    },

    /// Search by title, ISBN or author
    Search {
        /// Search keyword (empty lists the newest books)
        #[arg(default_value = "")]
        keyword: String,
    },

    /// Show one book, by ISBN or by the first search hit for a keyword
    Show {
        /// ISBN or keyword
        query: String,
    },

    /// Look up catalogue metadata for an ISBN
    Lookup {
        /// ISBN, hyphens allowed
        isbn: String,
    },

    /// Add a book to the catalogue (admin)
    Add {
        /// ISBN, hyphens allowed
        isbn: String,

        /// Title (filled in from the ISBN lookup when omitted)
        #[arg(short, long)]
        title: Option<String>,

        #[arg(long)]
        author: Option<String>,

        #[arg(long)]
        publisher: Option<String>,

        /// Tags, separated by spaces or commas
        #[arg(long)]
        tags: Option<String>,

        /// Shelf location
        #[arg(long)]
        location: Option<String>,

        /// Number of copies
        #[arg(short, long, default_value = "1")]
        copies: i64,

        /// Skip the ISBN metadata lookup
        #[arg(long)]
        no_lookup: bool,
    },
}

/// Run the books command.
pub async fn run(args: BooksArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let books = client.books();

    match args.command {
        BooksCommand::Recent { limit } => {
            let list = books.recent(limit).await?;
            print_summaries("Recently Added", &list, ctx)
        }
        BooksCommand::Search { keyword } => {
            let list = books.search(&keyword).await?;
            print_summaries("Search Results", &list, ctx)
        }
        BooksCommand::Show { query } => {
            let book = match normalize_isbn(&query) {
                Some(isbn) => Some(books.get(&isbn).await?),
                None => books.find(&query).await?,
            };
            match book {
                Some(book) => print_book(&book, ctx),
                None if ctx.json_output => ctx.print_json(&serde_json::Value::Null),
                None => {
                    ui::empty(&format!("No book matches \"{}\"", query));
                    Ok(())
                }
            }
        }
        BooksCommand::Lookup { isbn } => {
            let isbn = parse_isbn(&isbn)?;
            let info = books.lookup_isbn(&isbn).await?;
            if ctx.json_output {
                return ctx.print_json(&info);
            }
            ui::heading(&format!("ISBN {}", isbn));
            print_field("Title", info.title.as_deref());
            print_field("Author", info.author.as_deref());
            print_field("Publisher", info.publisher.as_deref());
            print_field("Published", info.publish_date.as_deref());
            if !info.tags.is_empty() {
                print_field("Tags", Some(&info.tags.join(", ")));
            }
            Ok(())
        }
        BooksCommand::Add {
            isbn,
            title,
            author,
            publisher,
            tags,
            location,
            copies,
            no_lookup,
        } => {
            let isbn = parse_isbn(&isbn)?;
            let mut book = NewBook::new(&isbn, title.clone().unwrap_or_default()).with_copies(copies);
            if !no_lookup {
                // The form is usable without metadata; the client has
                // already shown why the lookup failed.
                if let Ok(info) = books.lookup_isbn(&isbn).await {
                    book.merge_lookup(info);
                }
            }
            // Explicit flags beat looked-up values.
            if let Some(title) = title {
                book.title = title;
            }
            book.author = author.or(book.author);
            book.publisher = publisher.or(book.publisher);
            book.location = location;
            if let Some(tags) = tags {
                book.tags = parse_tags(&tags);
            }
            if book.title.trim().is_empty() {
                bail!("a title is required (pass --title)");
            }

            let created = books.create(&book).await?;
            if ctx.json_output {
                ctx.print_json(&created)
            } else {
                ui::success(format!("Added {} ({} copies)", created.title, created.total));
                Ok(())
            }
        }
    }
}

pub(crate) fn parse_isbn(raw: &str) -> Result<String> {
    match normalize_isbn(raw) {
        Some(isbn) => Ok(isbn),
        None => bail!("not a valid ISBN: {}", raw),
    }
}

fn print_field(label: &str, value: Option<&str>) {
    let dim = Style::new().dim();
    match value {
        Some(v) if !v.is_empty() => println!("{:<12} {}", label, v),
        _ => println!("{:<12} {}", label, dim.apply_to("-")),
    }
}

fn print_summaries(title: &str, list: &[BookSummary], ctx: &Context) -> Result<()> {
    if ctx.json_output {
        return ctx.print_json(list);
    }

    let dim = Style::new().dim();
    ui::heading(title);
    if list.is_empty() {
        ui::empty("No books found");
        return Ok(());
    }
    for book in list {
        let stock = if book.stock > 0 {
            Style::new().green().apply_to(format!("{} left", book.stock))
        } else {
            Style::new().red().apply_to("out".to_string())
        };
        println!(
            "{} {} {} {}",
            dim.apply_to(&book.isbn),
            ui::truncate(&book.title, 40),
            dim.apply_to(book.author.as_deref().unwrap_or("")),
            stock
        );
    }
    Ok(())
}

fn print_book(book: &Book, ctx: &Context) -> Result<()> {
    if ctx.json_output {
        return ctx.print_json(book);
    }

    ui::heading(&book.title);
    print_field("ISBN", Some(&book.isbn));
    print_field("Author", book.author.as_deref());
    print_field("Publisher", book.publisher.as_deref());
    print_field("Published", book.publish_date.as_deref());
    print_field("Location", book.location.as_deref());
    println!("{:<12} {}/{}", "Stock", book.stock, book.total);
    if !book.tags.is_empty() {
        print_field("Tags", Some(&book.tags.join(", ")));
    }
    if let Some(id) = book.user_borrow_id {
        println!();
        println!("You have this book (borrow #{}).", id);
    } else if book.is_available() {
        println!();
        println!("Available. Borrow it with 'libris borrows borrow {}'.", book.isbn);
    }
    if let Some(summary) = book.summary.as_deref().filter(|s| !s.is_empty()) {
        println!();
        println!("{}", summary);
    }
    Ok(())
}
