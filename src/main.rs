use std::{env, fs::File};

use anyhow::{Context, Result, bail};
use sqlite_inspect::{
    inspect,
    record::Value,
    schema::SchemaCatalog,
    storage::{Pager, ReadableStorage},
};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: sqlite-inspect <database path> <command> [table]";
const COMMANDS: &str = ".dbinfo .pages .tables .schema .rows <table> .stats <table>";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut args = env::args().skip(1);
    let (Some(path), Some(command)) = (args.next(), args.next()) else {
        bail!("{USAGE}\navailable commands: {COMMANDS}");
    };

    let file = File::open(&path).with_context(|| format!("failed to open {path}"))?;
    let mut pager = Pager::new(ReadableStorage::new(file))
        .with_context(|| format!("{path} is not a readable database"))?;

    match command.as_str() {
        ".dbinfo" => db_info(&mut pager),
        ".pages" => pages(&mut pager),
        ".tables" => tables(&mut pager),
        ".schema" => schema(&mut pager),
        ".rows" => rows(&mut pager, &table_argument(args.next())?),
        ".stats" => stats(&mut pager, &table_argument(args.next())?),
        other => bail!("unknown command: {other}\navailable commands: {COMMANDS}"),
    }
}

fn table_argument(arg: Option<String>) -> Result<String> {
    arg.context("missing table name")
}

fn catalog(pager: &mut Pager) -> Result<SchemaCatalog> {
    inspect::build_catalog(pager).context("failed to read the schema table")
}

fn db_info(pager: &mut Pager) -> Result<()> {
    let catalog = catalog(pager)?;
    let header = pager.header();

    for (label, value) in [
        ("database page size", (*header.page_size).to_string()),
        ("write format", header.write_version.to_string()),
        ("read format", header.read_version.to_string()),
        ("reserved bytes", header.reserved_space.to_string()),
        ("file change counter", header.file_change_counter.to_string()),
        ("database page count", header.page_count.to_string()),
        ("freelist page count", header.freelist_page_count.to_string()),
        ("schema cookie", header.schema_cookie.to_string()),
        ("schema format", header.schema_format.to_string()),
        ("default cache size", header.default_page_cache_size.to_string()),
        ("autovacuum top root", header.largest_root_btree_page.to_string()),
        ("incremental vacuum", u8::from(header.incremental_vacuum).to_string()),
        ("text encoding", header.text_encoding.to_string()),
        ("user version", header.user_version.to_string()),
        ("application id", header.application_id.to_string()),
        ("software version", header.sqlite_version.to_string()),
        ("file size", pager.file_size().to_string()),
        ("number of pages", pager.page_count().to_string()),
        ("number of tables", catalog.table_count().to_string()),
    ] {
        println!("{label:<21}{value}");
    }

    Ok(())
}

fn pages(pager: &mut Pager) -> Result<()> {
    for (page_index, page) in inspect::analyse_pages(pager) {
        let page = match page {
            Ok(page) => page,
            Err(e) => {
                println!("page {}: {e:#}", page_index + 1);
                continue;
            }
        };

        let header = &page.header;
        println!(
            "page {}: {}, {} cells, content at {}, {} fragmented bytes",
            page_index + 1,
            header.page_type.name(),
            header.cell_count,
            header.cell_content_start,
            header.fragmented_free_bytes,
        );
        if let Some(right_most_pointer) = header.right_most_pointer {
            println!("  right most pointer: {right_most_pointer}");
        }

        for (slot, error) in page.errors() {
            println!("  cell {slot}: {error}");
        }
    }

    Ok(())
}

fn tables(pager: &mut Pager) -> Result<()> {
    let catalog = catalog(pager)?;
    let names = catalog.table_names();

    let width = names.iter().map(|name| name.len()).max().unwrap_or(0) + 2;
    let per_line = (80 / width.max(1)).max(1);

    for line in names.chunks(per_line) {
        let line = line
            .iter()
            .map(|name| format!("{name:<width$}"))
            .collect::<String>();
        println!("{}", line.trim_end());
    }

    Ok(())
}

fn schema(pager: &mut Pager) -> Result<()> {
    let catalog = catalog(pager)?;

    for table in catalog.tables() {
        println!(
            "{} (root page {}, {} rows on root)",
            table.name(),
            table
                .root_page()
                .map_or_else(|| "-".to_string(), |page| page.to_string()),
            table.row_count(),
        );

        for column in table.columns() {
            println!("  {} {}", column.name, column.declared_type);
        }
    }

    Ok(())
}

fn rows(pager: &mut Pager, name: &str) -> Result<()> {
    let catalog = catalog(pager)?;
    let table = catalog
        .table(name)
        .with_context(|| format!("no such table: {name}"))?;

    for row in table.rows() {
        let values = (0..table.column_count().max(row.record.len()))
            .map(|column| table.value(row, column).to_string())
            .collect::<Vec<_>>();

        println!("{}", values.join("|"));
    }

    Ok(())
}

fn stats(pager: &mut Pager, name: &str) -> Result<()> {
    let catalog = catalog(pager)?;
    let table = catalog
        .table(name)
        .with_context(|| format!("no such table: {name}"))?;

    let statistics = table.statistics();
    println!("{name}: {} rows", statistics.row_count);

    for column in statistics.columns {
        let show = |value: Option<Value>| value.map_or_else(|| "-".to_string(), |v| v.to_string());

        println!(
            "  {}: {} values, {} nulls, {} distinct, min {}, max {}",
            column.name,
            column.non_null,
            column.nulls,
            column.distinct,
            show(column.min),
            show(column.max),
        );
    }

    Ok(())
}
