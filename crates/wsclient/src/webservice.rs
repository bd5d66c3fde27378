//! Date formats of each web-service family.

use chrono::NaiveDate;

use afipedi_invoicing::WebService;

/// `strftime` format AFIP expects for dates of `ws`.
pub fn date_format(ws: WebService) -> &'static str {
    match ws {
        WebService::Wsfe => "%Y%m%d",
        WebService::Wsfex => "%Y%m%d",
        WebService::Wsbfe => "%Y%m%d",
    }
}

pub fn format_ws_date(ws: WebService, date: NaiveDate) -> String {
    date.format(date_format(ws)).to_string()
}
