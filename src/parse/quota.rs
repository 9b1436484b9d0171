//! Quota-attainment transaction rows

use std::collections::HashMap;

use crate::detect::signatures;
use crate::model::{CanonicalRow, QuotaAttainmentRow, RowError, RowRejection};
use crate::parse::cells::{self, RowContext};
use crate::parse::table::{self, Cell, Table};

struct Columns {
    date: Option<usize>,
    transaction: Option<usize>,
    product: Option<usize>,
    amount: Option<usize>,
}

impl Columns {
    fn resolve(index: &HashMap<String, usize>) -> Self {
        Self {
            date: table::find_column(index, signatures::DATE),
            transaction: table::find_column(index, signatures::TRANSACTION),
            product: table::find_column(index, signatures::PRODUCT),
            amount: table::find_column(index, signatures::AMOUNT),
        }
    }
}

pub(crate) fn parse(
    ctx: &RowContext<'_>,
    index: &HashMap<String, usize>,
    table: &Table,
) -> (Vec<CanonicalRow>, Vec<RowRejection>) {
    let columns = Columns::resolve(index);

    table
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| !Table::row_is_blank(row))
        .fold(
            (Vec::new(), Vec::new()),
            |(mut rows, mut rejections), (idx, row)| {
                match parse_row(ctx, &columns, row) {
                    Ok(row) => rows.push(row),
                    Err(error) => rejections.push(RowRejection::new(idx, error)),
                }
                (rows, rejections)
            },
        )
}

fn parse_row(
    ctx: &RowContext<'_>,
    columns: &Columns,
    row: &[Cell],
) -> Result<CanonicalRow, RowError> {
    let (date, _) = cells::date_cell(row, columns.date, "date")?;
    let transaction_id = cells::text_cell(row, columns.transaction, "transaction id")?;
    let product = cells::product_cell(row, columns.product, "product")?;
    let amount = cells::decimal_cell(row, columns.amount, "amount")?;

    Ok(CanonicalRow::QuotaAttainment(QuotaAttainmentRow {
        account_id: ctx.account_id.to_string(),
        dataset_id: ctx.dataset_id.to_string(),
        date,
        transaction_id,
        product,
        amount,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Dataset, DatasetType};
    use crate::parse::{parse_rows, read_table};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dataset() -> Dataset {
        Dataset::new(
            "acct-1",
            DatasetType::QuotaAttainment,
            "quota.csv",
            "uploads/quota.csv",
            None,
        )
    }

    #[test]
    fn test_parse_quota_transactions() {
        let bytes = b"Date,Transaction ID,Product,Amount\n\
            2024-01-15,txn-100,enterprise,1099.99\n\
            2024-01-16,txn-101,pro,49.50\n";
        let table = read_table(bytes, "quota.csv").unwrap();

        let (rows, rejections) = parse_rows(&dataset(), DatasetType::QuotaAttainment, &table);
        assert_eq!(rejections, Vec::new());
        assert_eq!(rows.len(), 2);

        let CanonicalRow::QuotaAttainment(first) = &rows[0] else {
            panic!("wrong row variant");
        };
        assert_eq!(first.transaction_id, "txn-100");
        assert_eq!(first.amount, Decimal::from_str("1099.99").unwrap());
    }

    #[test]
    fn test_missing_transaction_id_rejected() {
        let bytes = b"Date,Transaction ID,Product,Amount\n2024-01-15,,pro,10.00\n";
        let table = read_table(bytes, "quota.csv").unwrap();
        let (rows, rejections) = parse_rows(&dataset(), DatasetType::QuotaAttainment, &table);
        assert!(rows.is_empty());
        assert_eq!(
            rejections[0].error,
            RowError::MissingField("transaction id".into())
        );
    }

    #[test]
    fn test_date_round_trips_to_source_string() {
        // A date-only cell re-serializes to the same ISO string it was
        // parsed from.
        let source = "2024-01-15";
        let bytes = format!(
            "Date,Transaction ID,Product,Amount\n{},txn-1,pro,10.00\n",
            source
        );
        let table = read_table(bytes.as_bytes(), "quota.csv").unwrap();
        let (rows, _) = parse_rows(&dataset(), DatasetType::QuotaAttainment, &table);
        let record = rows[0].to_record();
        assert_eq!(record["date"], source);
    }
}
