//! Raw usage event rows

use std::collections::HashMap;

use crate::detect::signatures;
use crate::model::{CanonicalRow, RawUsageRow, RowError, RowRejection};
use crate::parse::cells::{self, RowContext};
use crate::parse::table::{self, Cell, Table};

struct Columns {
    date: Option<usize>,
    product: Option<usize>,
    tokens: Option<usize>,
    user: Option<usize>,
    project: Option<usize>,
}

impl Columns {
    fn resolve(index: &HashMap<String, usize>) -> Self {
        Self {
            date: table::find_column(index, signatures::DATE),
            product: table::find_column(index, signatures::PRODUCT),
            tokens: table::find_column(index, signatures::TOKENS),
            user: table::find_column(index, signatures::USER),
            project: table::find_column(index, signatures::PROJECT),
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
    let (date, time) = cells::date_cell(row, columns.date, "date")?;
    let product = cells::product_cell(row, columns.product, "product")?;
    let tokens = cells::tokens_cell(row, columns.tokens, "tokens")?;

    Ok(CanonicalRow::RawUsage(RawUsageRow {
        account_id: ctx.account_id.to_string(),
        dataset_id: ctx.dataset_id.to_string(),
        date,
        time,
        product,
        tokens,
        user_id: cells::optional_text(row, columns.user),
        project_id: cells::optional_text(row, columns.project),
    }))
}
