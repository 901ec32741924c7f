#[cfg(test)]
mod model_tests {
    use jiff::Timestamp;
    use rust_decimal::Decimal;

    use crate::{
        display::LocalDateTime,
        models::{
            Attachment, Decision, Document, DocumentFilter, DocumentKind, DocumentStatus,
            DocumentSummary, EntryType, FlowStep, LineItem, NewDocument, NewLineItem, Role,
            StepFlow, TrackingEntry,
        },
        models::requests::validate_line_items,
        params::{ApproverAssignment, CreateDocument, ListDocuments, LineItemInput},
        ApprovalError,
    };

    // 2022-01-01 12:00:00 UTC, midday so the local date is stable
    const CREATED: i64 = 1_641_038_400;

    fn flow(roles: &[Role]) -> StepFlow {
        StepFlow::new(
            roles
                .iter()
                .zip(1..)
                .map(|(role, position)| FlowStep {
                    position,
                    role: *role,
                    assigned_user: None,
                })
                .collect(),
        )
        .unwrap()
    }

    fn line(order: u32, account_id: u64, entry_type: EntryType, cents: i64) -> LineItem {
        LineItem {
            id: u64::from(order),
            document_id: 7,
            account_id,
            entry_type,
            amount: Decimal::new(cents, 2),
            description: None,
            order_number: order,
        }
    }

    fn create_test_document() -> Document {
        let step_flow = flow(&Role::ALL);
        let mut tracking: Vec<TrackingEntry> = step_flow
            .iter()
            .map(|step| TrackingEntry::open(7, step.position, step.role))
            .collect();
        tracking[0].action = Some(Decision::Approved);
        tracking[0].handled_by = Some(11);
        tracking[0].acted_at = Some(Timestamp::from_second(CREATED + 60).unwrap());
        tracking[0].remarks = Some("Receipts checked".to_string());

        Document {
            id: 7,
            kind: DocumentKind::Disbursement,
            control_number: "DV-22-Q7W2ZK".to_string(),
            title: "Printer toner".to_string(),
            description: Some("Quarterly supplies".to_string()),
            status: DocumentStatus::Pending,
            current_step: 2,
            version: 1,
            created_by: 11,
            created_at: Timestamp::from_second(CREATED).unwrap(),
            updated_at: Timestamp::from_second(CREATED + 60).unwrap(),
            line_items: vec![
                line(1, 6200, EntryType::Debit, 125_000),
                line(2, 1000, EntryType::Credit, 125_000),
            ],
            step_flow,
            tracking,
            attachments: vec![Attachment {
                id: 1,
                document_id: 7,
                file_path: "documents/7/1-invoice.pdf".to_string(),
                file_name: "invoice.pdf".to_string(),
                file_type: "application/pdf".to_string(),
                created_at: Timestamp::from_second(CREATED).unwrap(),
            }],
        }
    }

    fn balanced_params() -> CreateDocument {
        CreateDocument {
            kind: "journal".to_string(),
            title: "  Accrual reversal ".to_string(),
            description: Some("   ".to_string()),
            prefix: " jv ".to_string(),
            created_by: 1,
            line_items: vec![
                LineItemInput {
                    account_id: 10,
                    entry_type: "debit".to_string(),
                    amount: "100.5".to_string(),
                    ..Default::default()
                },
                LineItemInput {
                    account_id: 20,
                    entry_type: "cr".to_string(),
                    amount: "100.50".to_string(),
                    ..Default::default()
                },
            ],
            approvers: vec![],
        }
    }

    #[test]
    fn test_status_with_icon() {
        assert_eq!(DocumentStatus::Approved.with_icon(), "✓ Approved");
        assert_eq!(DocumentStatus::Rejected.with_icon(), "✗ Rejected");
        assert_eq!(DocumentStatus::Pending.with_icon(), "○ Pending");
    }

    #[test]
    fn test_enum_round_trips_through_storage_strings() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>(), Ok(role));
        }
        for status in [
            DocumentStatus::Pending,
            DocumentStatus::Approved,
            DocumentStatus::Rejected,
        ] {
            assert_eq!(status.as_str().parse::<DocumentStatus>(), Ok(status));
        }
        assert_eq!("Accounting Head".parse::<Role>(), Ok(Role::AccountingHead));
        assert_eq!("approve".parse::<Decision>(), Ok(Decision::Approved));
        assert!("maybe".parse::<Decision>().is_err());
    }

    #[test]
    fn test_step_flow_rejects_gaps_and_empty() {
        let gap = vec![
            FlowStep {
                position: 1,
                role: Role::AccountingAssistant,
                assigned_user: None,
            },
            FlowStep {
                position: 3,
                role: Role::Svp,
                assigned_user: None,
            },
        ];
        let err = StepFlow::new(gap).unwrap_err();
        assert!(err.to_string().contains("contiguous"));
        assert!(StepFlow::new(vec![]).is_err());
    }

    #[test]
    fn test_step_flow_deserialization_validates() {
        let ok: StepFlow =
            serde_json::from_str(r#"[{"position":1,"role":"auditor","assigned_user":4}]"#)
                .unwrap();
        assert_eq!(ok.step(1).and_then(|s| s.assigned_user), Some(4));
        assert_eq!(ok.step(0), None);
        assert_eq!(ok.step(2), None);
        assert_eq!(ok.len(), 1);
        assert!(!ok.is_empty());

        let bad = serde_json::from_str::<StepFlow>(r#"[{"position":2,"role":"auditor"}]"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_document_totals_and_current_step() {
        let mut document = create_test_document();
        assert_eq!(document.total_debits(), Decimal::new(125_000, 2));
        assert_eq!(document.total_credits(), Decimal::new(125_000, 2));
        assert_eq!(
            document.current_flow_step().map(|s| s.role),
            Some(Role::AccountingHead)
        );

        document.status = DocumentStatus::Rejected;
        assert!(document.current_flow_step().is_none());
    }

    #[test]
    fn test_document_display() {
        let output = create_test_document().to_string();

        assert!(output.contains("# DV-22-Q7W2ZK Printer toner"));
        assert!(output.contains("- Status: ○ Pending"));
        assert!(output.contains("- Awaiting: step 2 of 4 (Accounting Head)"));
        assert!(output.contains("- Created: 2022-01-01"));
        assert!(output.contains("Quarterly supplies"));
        assert!(output.contains("## Line Items"));
        assert!(output.contains("| 1 | 6200 | 1250.00 |  |  |"));
        assert!(output.contains("**Total** | **1250.00** | **1250.00**"));
        assert!(output.contains("## Approval Trail"));
        assert!(output.contains("1. Accounting Assistant: ✓ approved by user 11"));
        assert!(output.contains("  > Receipts checked"));
        assert!(output.contains("4. SVP: ○ waiting"));
        assert!(output.contains("- invoice.pdf (application/pdf, ID: 1)"));
    }

    #[test]
    fn test_document_display_terminal() {
        let mut document = create_test_document();
        document.status = DocumentStatus::Rejected;
        document.attachments.clear();
        let output = document.to_string();

        assert!(output.contains("- Status: ✗ Rejected"));
        assert!(output.contains("- Steps: 4"));
        assert!(!output.contains("Awaiting"));
        assert!(!output.contains("## Attachments"));
    }

    #[test]
    fn test_summary_from_document() {
        let summary = DocumentSummary::from(&create_test_document());
        assert_eq!(summary.id, 7);
        assert_eq!(summary.current_step, 2);
        assert_eq!(summary.total_steps, 4);
        assert_eq!(summary.awaiting_role, Some(Role::AccountingHead));
        assert_eq!(summary.total_amount, Decimal::new(125_000, 2));

        let output = summary.to_string();
        assert!(output.contains("## DV-22-Q7W2ZK Printer toner (ID: 7)"));
        assert!(output.contains("(step 2/4, Accounting Head)"));
        assert!(output.ends_with("\n\n"));
    }

    #[test]
    fn test_new_document_normalizes_fields() {
        let request = NewDocument::try_from(balanced_params()).unwrap();
        assert_eq!(request.kind, DocumentKind::Journal);
        assert_eq!(request.title, "Accrual reversal");
        assert_eq!(request.description, None);
        assert_eq!(request.prefix, "JV");
        assert_eq!(request.line_items[0].amount.to_string(), "100.50");
        assert_eq!(request.line_items[1].entry_type, EntryType::Credit);
        assert_eq!(request.line_items[1].order_number, 2);
    }

    #[test]
    fn test_new_document_rejects_unbalanced_lines() {
        let mut params = balanced_params();
        params.line_items[1].amount = "99.00".to_string();
        let err = NewDocument::try_from(params).unwrap_err();
        assert!(matches!(err, ApprovalError::Validation { ref field, .. } if field == "line_items"));
        assert!(err.to_string().contains("Debits (100.50) must equal credits (99.00)"));
    }

    #[test]
    fn test_new_document_rejects_bad_amounts() {
        for amount in ["0", "-5", "1.005", "ten"] {
            let mut params = balanced_params();
            params.line_items[0].amount = amount.to_string();
            assert!(
                NewDocument::try_from(params).is_err(),
                "amount {amount} accepted"
            );
        }
    }

    #[test]
    fn test_new_document_rejects_amounts_without_two_decimal_places() {
        let mut params = balanced_params();
        params.line_items[0].amount = "50000000000000000000000000000".to_string();
        params.line_items[1].amount = "50000000000000000000000000000".to_string();
        let err = NewDocument::try_from(params).unwrap_err();
        assert!(matches!(err, ApprovalError::Validation { ref field, .. } if field == "line_items[0]"));
        assert!(err.to_string().contains("too large"));
    }

    #[test]
    fn test_line_item_totals_overflow_is_a_validation_error() {
        let line = |entry_type, order_number| NewLineItem {
            account_id: 1,
            entry_type,
            amount: Decimal::MAX,
            description: None,
            order_number,
        };
        let items = vec![
            line(EntryType::Debit, 1),
            line(EntryType::Debit, 2),
            line(EntryType::Credit, 3),
        ];

        let err = validate_line_items(&items).unwrap_err();
        assert!(matches!(err, ApprovalError::Validation { ref field, .. } if field == "line_items"));
        assert!(err.to_string().contains("debit total overflows"));
    }

    #[test]
    fn test_new_document_rejects_missing_lines_and_title() {
        let mut params = balanced_params();
        params.line_items.clear();
        assert!(NewDocument::try_from(params).is_err());

        let mut params = balanced_params();
        params.title = "   ".to_string();
        let err = NewDocument::try_from(params).unwrap_err();
        assert!(err.to_string().contains("Title must not be empty"));
    }

    #[test]
    fn test_new_document_rejects_duplicate_assignment() {
        let mut params = balanced_params();
        params.approvers = vec![
            ApproverAssignment {
                position: 2,
                user_id: 5,
            },
            ApproverAssignment {
                position: 2,
                user_id: 6,
            },
        ];
        let err = NewDocument::try_from(params).unwrap_err();
        assert!(err.to_string().contains("Step 2 is assigned more than once"));
    }

    #[test]
    fn test_filter_from_list_params() {
        let params = ListDocuments {
            kind: Some("journal".to_string()),
            awaiting_role: Some("auditor".to_string()),
            ..Default::default()
        };
        let filter = DocumentFilter::try_from(&params).unwrap();
        assert_eq!(filter.kind, Some(DocumentKind::Journal));
        assert_eq!(filter.awaiting_role, Some(Role::Auditor));
        assert_eq!(filter.status, None);

        let bad = ListDocuments {
            status: Some("archived".to_string()),
            ..Default::default()
        };
        assert!(DocumentFilter::try_from(&bad).is_err());
    }

    #[test]
    fn test_local_date_time_display_format() {
        let timestamp = Timestamp::from_second(CREATED).unwrap();
        let formatted = LocalDateTime(&timestamp).to_string();

        // YYYY-MM-DD HH:MM:SS followed by a zone abbreviation
        assert!(formatted.starts_with("2022-01-01 "));
        assert_eq!(formatted.as_bytes()[13], b':');
        assert!(formatted.len() > "2022-01-01 12:00:00".len());
    }
}
