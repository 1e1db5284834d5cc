use crate::types::SourceEpoch;

/// Builds the order index URL for `year` under `base_url`.
pub fn resolve(base_url: &str, year: i32) -> String {
    let base = base_url.trim_end_matches('/');
    match SourceEpoch::for_year(year) {
        SourceEpoch::Legacy => {
            format!("{base}/AdministrativeOrdersIndex/{year}AdministrativeOrders.aspx")
        }
        SourceEpoch::Modern => {
            format!("{base}/Administrative-Orders-Index/{year}-Administrative-Orders")
        }
    }
}
