//! Turns a [CandidateRow] into a [MotorCustomer].
//!
//! Materialization is all-or-nothing: the first mandatory column that is absent, null or of
//! the wrong type fails with [ValidationError::MissingData], and the first enum column with a
//! value outside its closed set fails with [ValidationError::EnumParse]. Sub-records follow the
//! same rules over their own columns and a failure in any of them fails the whole record.
use crate::error::ValidationError;
use crate::record::{Address, Brand, Finance, MotorCustomer, PaymentType, Premium, Vehicle};
use crate::row::{CandidateRow, StubId};

/// Source column names.
pub(crate) mod columns {
    pub(crate) const STUB_ID: &str = "stubId";
    pub(crate) const REFERENCE: &str = "reference";
    pub(crate) const WEB_REFERENCE: &str = "webReference";
    pub(crate) const EMAIL: &str = "email";
    pub(crate) const TITLE: &str = "title";
    pub(crate) const FIRST_NAME: &str = "firstName";
    pub(crate) const SURNAME: &str = "surname";
    pub(crate) const HOUSE_NUMBER: &str = "houseNumber";
    pub(crate) const ADDRESS_LINE_1: &str = "addressLine1";
    pub(crate) const ADDRESS_LINE_2: &str = "addressLine2";
    pub(crate) const ADDRESS_LINE_3: &str = "addressLine3";
    pub(crate) const ADDRESS_LINE_4: &str = "addressLine4";
    pub(crate) const POSTCODE: &str = "postcode";
    pub(crate) const PHONE: &str = "phone";
    pub(crate) const BRAND: &str = "brand";
    pub(crate) const ACTIVE: &str = "active";
    pub(crate) const PAYMENT_TYPE: &str = "paymentType";
    pub(crate) const TOTAL_SELLING_PRICE: &str = "totalSellingPrice";
    pub(crate) const NETT_PREMIUM: &str = "nettPremium";
    pub(crate) const GROSS_PREMIUM: &str = "grossPremium";
    pub(crate) const OUTSTANDING_BALANCE: &str = "outstandingBalance";
    pub(crate) const CARD_NUMBER: &str = "cardNumber";
    pub(crate) const DEPOSIT: &str = "deposit";
    pub(crate) const INTEREST: &str = "interest";
    pub(crate) const APR: &str = "apr";
    pub(crate) const TOTAL_NUMBER_OF_INSTALLMENTS: &str = "totalNumberOfInstallments";
    pub(crate) const MONTHLY_INSTALLMENT_AMOUNT: &str = "monthlyInstallmentAmount";
    pub(crate) const TOTAL_INSTALLMENT_AMOUNT: &str = "totalInstallmentAmount";
    pub(crate) const FINANCE_PROVIDER: &str = "financeProvider";
    pub(crate) const BANK_SORT_CODE: &str = "bankSortCode";
    pub(crate) const BANK_ACCOUNT_NUMBER: &str = "bankAccountNumber";
    pub(crate) const VEHICLE_REGISTRATION: &str = "vehicleRegistration";
    pub(crate) const MAKE: &str = "make";
    pub(crate) const MODEL: &str = "model";
}

/// Reads the row identity.
pub fn stub_id(row: &CandidateRow) -> Result<StubId, ValidationError> {
    row.required_i32(columns::STUB_ID).map(StubId::new)
}

/// Builds the domain record from one row. Pure; never returns a partially populated record.
pub fn materialize(row: &CandidateRow) -> Result<MotorCustomer, ValidationError> {
    Ok(MotorCustomer {
        reference: row.required_text(columns::REFERENCE)?,
        web_reference: row.required_text(columns::WEB_REFERENCE)?,
        email: row.required_text(columns::EMAIL)?,
        title: row.optional_text(columns::TITLE)?,
        first_name: row.required_text(columns::FIRST_NAME)?,
        surname: row.required_text(columns::SURNAME)?,
        address: address(row)?,
        phone: row.optional_text(columns::PHONE)?,
        brand: required_enum(row, columns::BRAND, Brand::parse)?,
        active: row.required_bool(columns::ACTIVE)?,
        payment_type: required_enum(row, columns::PAYMENT_TYPE, PaymentType::parse)?,
        premium: premium(row)?,
        finance: finance(row)?,
        vehicle: vehicle(row)?,
    })
}

fn address(row: &CandidateRow) -> Result<Address, ValidationError> {
    Ok(Address {
        house_number: row.required_text(columns::HOUSE_NUMBER)?,
        address_line1: row.required_text(columns::ADDRESS_LINE_1)?,
        address_line2: row.optional_text(columns::ADDRESS_LINE_2)?,
        address_line3: row.optional_text(columns::ADDRESS_LINE_3)?,
        address_line4: row.optional_text(columns::ADDRESS_LINE_4)?,
        postcode: row.required_text(columns::POSTCODE)?,
    })
}

fn premium(row: &CandidateRow) -> Result<Premium, ValidationError> {
    Ok(Premium {
        total_selling_price: row.required_decimal(columns::TOTAL_SELLING_PRICE)?,
        nett_premium: row.required_decimal(columns::NETT_PREMIUM)?,
        gross_premium: row.required_decimal(columns::GROSS_PREMIUM)?,
        outstanding_balance: row.required_decimal(columns::OUTSTANDING_BALANCE)?,
        card_number: row.optional_text(columns::CARD_NUMBER)?,
    })
}

fn finance(row: &CandidateRow) -> Result<Finance, ValidationError> {
    Ok(Finance {
        deposit: row.required_decimal(columns::DEPOSIT)?,
        interest: row.required_decimal(columns::INTEREST)?,
        apr: row.required_decimal(columns::APR)?,
        total_number_of_installments: row.required_i32(columns::TOTAL_NUMBER_OF_INSTALLMENTS)?,
        monthly_installment_amount: row.required_decimal(columns::MONTHLY_INSTALLMENT_AMOUNT)?,
        total_installment_amount: row.required_decimal(columns::TOTAL_INSTALLMENT_AMOUNT)?,
        finance_provider: row.optional_text(columns::FINANCE_PROVIDER)?,
        bank_sort_code: row.optional_text(columns::BANK_SORT_CODE)?,
        bank_account_number: row.optional_text(columns::BANK_ACCOUNT_NUMBER)?,
    })
}

fn vehicle(row: &CandidateRow) -> Result<Vehicle, ValidationError> {
    Ok(Vehicle {
        vehicle_registration: row.required_text(columns::VEHICLE_REGISTRATION)?,
        make: row.required_text(columns::MAKE)?,
        model: row.required_text(columns::MODEL)?,
    })
}

/// A missing enum column is `MissingData`; a present one that matches no variant is `EnumParse`.
fn required_enum<T>(
    row: &CandidateRow,
    column: &'static str,
    parse: fn(&str) -> Option<T>,
) -> Result<T, ValidationError> {
    let value = row.required_text(column)?;
    parse(&value).ok_or(ValidationError::EnumParse { column, value })
}
