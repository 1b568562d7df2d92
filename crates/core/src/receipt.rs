//! Receipt payload produced when a parking session ends.

use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::billing::present_charge;
use crate::errors::{ParkError, ParkResult};
use crate::models::slot_request::SlotRequestDetails;

/// The facts printed on a ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptFields {
    pub total_time: i64,
    pub total_charge: f64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub slot_number: String,
    pub user_name: String,
    pub user_email: String,
}

impl ReceiptFields {
    /// Reads the fields from a completed request.
    ///
    /// # Errors
    ///
    /// * `ParkError::InvalidState` - the request lacks a session field
    pub fn from_details(details: &SlotRequestDetails) -> ParkResult<Self> {
        let request = &details.request;
        let missing = |field: &str| {
            ParkError::InvalidState(format!("Request {} has no {}", request.id, field))
        };

        Ok(Self {
            total_time: request.total_time.ok_or_else(|| missing("total time"))?,
            total_charge: request.total_charge.ok_or_else(|| missing("total charge"))?,
            start_time: request.start_time.ok_or_else(|| missing("start time"))?,
            end_time: request.end_time.ok_or_else(|| missing("end time"))?,
            slot_number: details.slot.slot_number.clone(),
            user_name: details.user.name.clone(),
            user_email: details.user.email.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    #[serde(flatten)]
    pub fields: ReceiptFields,
    /// Base64 of the rendered ticket.
    pub document: String,
}

impl Receipt {
    pub fn render(fields: ReceiptFields, renderer: &dyn TicketRenderer) -> ParkResult<Self> {
        let bytes = renderer.render(&fields)?;
        Ok(Self {
            fields,
            document: STANDARD.encode(bytes),
        })
    }
}

/// Produces the printable document for a receipt.
pub trait TicketRenderer: Send + Sync {
    fn render(&self, fields: &ReceiptFields) -> ParkResult<Vec<u8>>;
}

/// Fixed-layout UTF-8 text ticket.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextTicket;

impl TicketRenderer for PlainTextTicket {
    fn render(&self, fields: &ReceiptFields) -> ParkResult<Vec<u8>> {
        let ticket = format!(
            "PARKING RECEIPT\n\
             ---------------\n\
             Slot:     {}\n\
             Name:     {}\n\
             Email:    {}\n\
             Start:    {}\n\
             End:      {}\n\
             Duration: {} min\n\
             Charge:   {}\n",
            fields.slot_number,
            fields.user_name,
            fields.user_email,
            fields.start_time.format("%Y-%m-%d %H:%M:%S UTC"),
            fields.end_time.format("%Y-%m-%d %H:%M:%S UTC"),
            fields.total_time,
            present_charge(fields.total_charge),
        );
        Ok(ticket.into_bytes())
    }
}
