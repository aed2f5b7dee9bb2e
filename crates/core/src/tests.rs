use super::dates::{end_date, format_date, parse_date, period_dates};
use super::ids::{ContractId, Plate, PlateError};
use super::paging::{paginate_desc, total_pages};
use super::*;
use time::macros::date;

fn draft() -> ContractDraft {
    ContractDraft {
        kind: String::new(),
        name: " 홍길동 ".to_string(),
        phone: "010-1234-5678".to_string(),
        plate: "11가1111".to_string(),
        day_fee: 15_000,
        start: Some(date!(2024 - 05 - 01)),
        days: 30,
        status: ContractStatus::Normal,
    }
}

#[test]
fn plate_validation() {
    assert_eq!(Plate::try_new("").unwrap_err(), PlateError::Empty);
    assert_eq!(Plate::try_new("   ").unwrap_err(), PlateError::Empty);
    assert_eq!(
        Plate::try_new("11가\u{0007}1111").unwrap_err(),
        PlateError::ContainsControl
    );
    assert_eq!(Plate::try_new(" 11가1111 ").unwrap().as_str(), "11가1111");
}

#[test]
fn generated_contract_ids_are_distinct_within_a_millisecond() {
    assert_eq!(ContractId::generate(1714521600000, 0).as_str(), "c_1714521600000");
    assert_eq!(
        ContractId::generate(1714521600000, 2).as_str(),
        "c_1714521600000_2"
    );
    assert!(ContractId::try_new("").is_err());
}

#[test]
fn end_date_law_holds_across_month_and_year_boundaries() {
    for (start, days) in [
        (date!(2024 - 05 - 01), 1),
        (date!(2024 - 05 - 01), 3),
        (date!(2024 - 02 - 28), 3),
        (date!(2023 - 12 - 30), 40),
    ] {
        let end = end_date(start, days).unwrap();
        assert_eq!(end, start + time::Duration::days(i64::from(days) - 1));
        assert_eq!(period_dates(start, end).len(), days as usize);
    }
    assert_eq!(end_date(date!(2024 - 02 - 28), 3), Some(date!(2024 - 03 - 01)));
    assert_eq!(end_date(date!(2024 - 05 - 01), 0), None);
}

#[test]
fn period_dates_lists_every_day_inclusive() {
    let dates = period_dates(date!(2024 - 05 - 01), date!(2024 - 05 - 03))
        .into_iter()
        .map(format_date)
        .collect::<Vec<_>>();
    assert_eq!(dates, vec!["2024-05-01", "2024-05-02", "2024-05-03"]);

    assert!(period_dates(date!(2024 - 05 - 03), date!(2024 - 05 - 01)).is_empty());
}

#[test]
fn history_pages_run_newest_first_and_clamp() {
    let dates = period_dates(date!(2024 - 05 - 01), date!(2024 - 05 - 03));

    let first = paginate_desc(&dates, 2, 0);
    assert_eq!(first.items, vec![date!(2024 - 05 - 03), date!(2024 - 05 - 02)]);
    assert_eq!(first.total_pages, 2);
    assert!(!first.has_prev());
    assert!(first.has_next());

    let second = paginate_desc(&dates, 2, 1);
    assert_eq!(second.items, vec![date!(2024 - 05 - 01)]);

    let clamped = paginate_desc(&dates, 2, 9);
    assert_eq!(clamped.page_index, 1);
    assert_eq!(clamped.items, second.items);

    let empty = paginate_desc::<time::Date>(&[], 31, 4);
    assert_eq!(empty.page_index, 0);
    assert_eq!(empty.total_pages, 1);
    assert!(empty.items.is_empty());

    assert_eq!(total_pages(62, 31), 2);
    assert_eq!(total_pages(63, 31), 3);
}

#[test]
fn dates_parse_and_format_as_iso() {
    assert_eq!(parse_date("2024-05-01").unwrap(), date!(2024 - 05 - 01));
    assert_eq!(format_date(date!(2024 - 01 - 09)), "2024-01-09");
    assert!(parse_date("2024-13-01").is_err());
    assert!(parse_date("").is_err());
}

#[test]
fn fees_derive_from_day_fee() {
    let fees = Fees::from_day_fee(15_000);
    assert_eq!(fees.week, 105_000);
    assert_eq!(fees.month, 450_000);
}

#[test]
fn contract_draft_derives_terms() {
    let terms = draft().validate().unwrap();
    assert_eq!(terms.kind, DEFAULT_CONTRACT_KIND);
    assert_eq!(terms.name, "홍길동");
    assert_eq!(terms.end, date!(2024 - 05 - 30));
    assert_eq!(terms.fees.month, 450_000);

    let contract = terms.into_contract(ContractId::generate(1, 0), "PCX".to_string(), false);
    assert_eq!(contract.billing_amount, contract.month_fee);
    assert!(contract.is_active());
}

#[test]
fn contract_draft_reports_every_missing_field_at_once() {
    let bad = ContractDraft {
        name: "  ".to_string(),
        phone: String::new(),
        day_fee: 0,
        start: None,
        days: 0,
        ..draft()
    };
    let err = bad.validate().unwrap_err();
    assert_eq!(
        err.fields(),
        &[
            ContractField::Name,
            ContractField::Phone,
            ContractField::DayFee,
            ContractField::StartDate,
            ContractField::Days,
            ContractField::EndDate,
        ]
    );
    assert!(!err.contains(ContractField::Plate));

    let no_plate = ContractDraft {
        plate: " ".to_string(),
        ..draft()
    };
    assert_eq!(no_plate.validate().unwrap_err().fields(), &[ContractField::Plate]);
}

#[test]
fn bike_draft_requires_plate_and_model() {
    let missing_model = BikeDraft {
        plate: "11가1111".to_string(),
        model: " ".to_string(),
        status: BikeStatus::Available,
    };
    assert_eq!(missing_model.validate().unwrap_err(), BikeDraftError::MissingModel);

    let missing_plate = BikeDraft {
        plate: String::new(),
        model: "PCX".to_string(),
        status: BikeStatus::Available,
    };
    assert_eq!(missing_plate.validate().unwrap_err(), BikeDraftError::MissingPlate);
}

#[test]
fn terminated_contracts_free_their_bike() {
    assert_eq!(desired_bike_status(ContractStatus::Terminated), BikeStatus::Available);
    assert_eq!(desired_bike_status(ContractStatus::Normal), BikeStatus::Rented);
    assert_eq!(desired_bike_status(ContractStatus::Overdue), BikeStatus::Rented);
}

#[test]
fn status_labels_round_trip() {
    for status in BikeStatus::ALL {
        assert_eq!(BikeStatus::parse(status.as_str()), Some(status));
    }
    for status in ContractStatus::ALL {
        assert_eq!(ContractStatus::parse(status.as_str()), Some(status));
    }
    assert_eq!(BikeStatus::parse("폐차"), None);
}
