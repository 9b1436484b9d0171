//! Manual adjustment rows

use std::collections::HashMap;

use crate::detect::signatures;
use crate::model::{CanonicalRow, ManualAdjustmentRow, RowError, RowRejection};
use crate::parse::cells::{self, RowContext};
use crate::parse::table::{self, Cell, Table};

struct Columns {
    date: Option<usize>,
    product: Option<usize>,
    amount: Option<usize>,
    note: Option<usize>,
}

impl Columns {
    fn resolve(index: &HashMap<String, usize>) -> Self {
        Self {
            date: table::find_column(index, signatures::DATE),
            product: table::find_column(index, signatures::PRODUCT),
            amount: table::find_column(index, signatures::AMOUNT),
            note: table::find_column(index, signatures::NOTE),
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
    let product = cells::product_cell(row, columns.product, "product")?;
    let amount = cells::decimal_cell(row, columns.amount, "amount")?;

    Ok(CanonicalRow::ManualAdjustment(ManualAdjustmentRow {
        account_id: ctx.account_id.to_string(),
        dataset_id: ctx.dataset_id.to_string(),
        date,
        product,
        amount,
        note: cells::optional_text(row, columns.note),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Dataset, DatasetType};
    use crate::parse::{parse_rows, read_table};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[test]
    fn test_parse_manual_adjustments() {
        let bytes = b"Date,Product,Amount,Reason\n\
            2024-01-15,pro,-120.00,duplicate charge\n\
            2024-01-20,Enterprise,\"$1,500.00\",\n";
        let table = read_table(bytes, "adjustments.csv").unwrap();
        let ds = Dataset::new(
            "acct-1",
            DatasetType::ManualAdjustments,
            "adjustments.csv",
            "uploads/adjustments.csv",
            None,
        );

        let (rows, rejections) = parse_rows(&ds, DatasetType::ManualAdjustments, &table);
        assert_eq!(rejections, Vec::new());
        assert_eq!(rows.len(), 2);

        let CanonicalRow::ManualAdjustment(first) = &rows[0] else {
            panic!("wrong row variant");
        };
        assert_eq!(first.amount, Decimal::from_str("-120.00").unwrap());
        assert_eq!(first.product, "pro");
        assert_eq!(first.note.as_deref(), Some("duplicate charge"));

        let CanonicalRow::ManualAdjustment(second) = &rows[1] else {
            panic!("wrong row variant");
        };
        assert_eq!(second.amount, Decimal::from_str("1500.00").unwrap());
        assert_eq!(second.note, None);
    }

    #[test]
    fn test_bad_amount_is_rejected_not_zeroed() {
        let bytes = b"Date,Product,Amount\n2024-01-15,pro,oops\n2024-01-16,pro,5.00\n";
        let table = read_table(bytes, "adjustments.csv").unwrap();
        let ds = Dataset::new(
            "acct-1",
            DatasetType::ManualAdjustments,
            "adjustments.csv",
            "uploads/adjustments.csv",
            None,
        );

        let (rows, rejections) = parse_rows(&ds, DatasetType::ManualAdjustments, &table);
        assert_eq!(rows.len(), 1);
        assert_eq!(rejections.len(), 1);
        assert_eq!(rejections[0].row, 0);
        assert_eq!(rejections[0].error, RowError::BadNumber("oops".into()));
    }
}
