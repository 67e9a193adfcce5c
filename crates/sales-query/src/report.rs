use core_types::SaleRecord;

pub const NO_SALES_MESSAGE: &str = "No sales data for this publisher.";
pub const DATE_PLACEHOLDER: &str = "date not specified";

/// `title | shop | price | DD-MM-YYYY`
pub fn format_sale(record: &SaleRecord) -> String {
    let date = match record.date_sale {
        Some(ts) => ts.format("%d-%m-%Y").to_string(),
        None => DATE_PLACEHOLDER.to_string(),
    };
    format!("{} | {} | {} | {}", record.title, record.shop, record.price, date)
}

/// The console lines for a query result: one per sale, or the no-data message.
pub fn render_report(records: &[SaleRecord]) -> Vec<String> {
    if records.is_empty() {
        return vec![NO_SALES_MESSAGE.to_string()];
    }
    records.iter().map(format_sale).collect()
}
