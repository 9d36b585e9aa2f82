//! Demo: JSON file -> JSON directory, then a JDBC-style table -> another table.
//!
//! Set `RUST_LOG=sparkless_io_core=debug` to see each dispatch. With
//! `SPARKLESS_IO_S3_*` (or `AWS_*`) credentials set, `s3://` locators work too.
use sparkless_io::prelude::*;
use tracing_subscriber::EnvFilter;

const URL: &str = "jdbc:sqlserver://demo.example.net:1433;database=sales";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let spark = IoSession::builder()
        .with_config(&IoConfig::from_env())
        .app_name("json_sql_pipeline")
        .get_or_create();

    let dir = tempfile::tempdir()?;
    let input = dir.path().join("sample_json.json");
    std::fs::write(
        &input,
        "[\n  {\"id\": 1, \"product\": \"bike\", \"price\": 120.5},\n  {\"id\": 2, \"product\": \"helmet\", \"price\": 35.0, \"note\": null}\n]\n",
    )?;

    let products = spark.read(
        &SourceSpec::json(input.display().to_string())
            .option("multiline", "true")
            .option("mode", "PERMISSIVE"),
    )?;
    println!("read from json:\n{}", products.as_polars());

    let out = format!("{}/data-json-write/", dir.path().display());
    spark.write(
        &products,
        &SinkSpec::json(&out).option("compression", "gzip"),
    )?;
    println!("wrote {out}");

    spark.register_table(URL, "products", &products)?;
    let jdbc = [
        ("url", URL),
        ("driver", "com.microsoft.sqlserver.jdbc.SQLServerDriver"),
        ("user", "demo"),
        ("password", "demo"),
    ];
    let cheap = spark.read(
        &SourceSpec::sql()
            .options(jdbc)
            .option("query", "SELECT id, product FROM products WHERE price < 100"),
    )?;
    println!("read from sql:\n{}", cheap.as_polars());

    spark.write(
        &cheap,
        &SinkSpec::sql()
            .options(jdbc)
            .option("dbtable", "salesLT.Product_write"),
    )?;
    println!(
        "tables at {URL}: {:?}",
        spark.engine().catalog().table_names(URL)?
    );
    Ok(())
}
