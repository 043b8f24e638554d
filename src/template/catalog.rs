use crate::error::{IngestError, Result};
use crate::model::{Role, TemplateId};
use crate::template::{ColumnSpec, Derivation, TemplateDescriptor};

/// Registry of template descriptors, built once and shared read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateCatalog {
    descriptors: Vec<TemplateDescriptor>,
}

impl TemplateCatalog {
    /// Catalog holding exactly the provided descriptors, in order.
    pub fn new(descriptors: Vec<TemplateDescriptor>) -> Self {
        Self { descriptors }
    }

    /// The five built-in templates.
    pub fn standard() -> Self {
        Self::new(vec![RIVAL, AJUR, MICROINVEST, BUSINESS_NAVIGATOR, UNIVERSUM])
    }

    pub fn descriptor_for(&self, id: TemplateId) -> Result<&TemplateDescriptor> {
        self.descriptors
            .iter()
            .find(|descriptor| descriptor.id == id)
            .ok_or(IngestError::NotFound(id))
    }

    pub fn descriptors(&self) -> &[TemplateDescriptor] {
        &self.descriptors
    }
}

impl Default for TemplateCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

/// Rival "хронологичен опис": one row per posting, accounts in separate
/// debit/credit columns. Exports carry a block of title rows above the header.
pub const RIVAL: TemplateDescriptor = TemplateDescriptor {
    id: TemplateId::Rival,
    product: "Ривал",
    labels: &[
        &["вид док"],
        &["номер документ", "номер на документ"],
        &["дата документ", "дата на документ"],
        &["сметка дебит"],
        &["сметка кредит"],
        &["стойност"],
        &["обяснение на статия", "обяснение"],
    ],
    columns: &[
        ColumnSpec::header(Role::DocumentType, &["вид документ", "вид док"], false),
        ColumnSpec::header(
            Role::DocumentNumber,
            &["номер документ", "номер на документ"],
            false,
        ),
        ColumnSpec::header(
            Role::OperationDate,
            &["дата документ", "дата на документ", "дата"],
            true,
        ),
        ColumnSpec::header(Role::PartnerName, &["име", "контрагент"], false),
        ColumnSpec::header(Role::DebitAccount, &["сметка дебит", "дебит"], true),
        ColumnSpec::header(Role::CreditAccount, &["сметка кредит", "кредит"], true),
        ColumnSpec::header(Role::Amount, &["стойност", "сума"], true),
        ColumnSpec::header(
            Role::Description,
            &["обяснение на статия", "обяснение"],
            false,
        ),
    ],
    derivation: Derivation::Direct,
    signed_amounts: false,
};

/// AJUR audit export. Each side has its own analytical account column, both
/// headed "аналитична сметка" and bound in order.
pub const AJUR: TemplateDescriptor = TemplateDescriptor {
    id: TemplateId::Ajur,
    product: "AJUR",
    labels: &[
        &["дата рег"],
        &["вид док"],
        &["документ no"],
        &["рег. no"],
        &["дт с/ка"],
        &["кт с/ка"],
        &["аналитична сметка"],
        &["обяснителен текст"],
    ],
    columns: &[
        ColumnSpec::header(Role::OperationDate, &["дата рег"], false),
        ColumnSpec::header(Role::DocumentType, &["вид док"], false),
        ColumnSpec::header(
            Role::DocumentReference,
            &["документ no / дата", "документ no", "документ"],
            false,
        ),
        ColumnSpec::header(Role::DebitAccount, &["дт с/ка", "дт сметка", "дебит"], true),
        ColumnSpec::header(Role::AnalyticalDebit, &["аналитична сметка", "аналитична"], false),
        ColumnSpec::header(Role::CreditAccount, &["кт с/ка", "кт сметка", "кредит"], true),
        ColumnSpec::header(Role::AnalyticalCredit, &["аналитична сметка", "аналитична"], false),
        ColumnSpec::header(Role::Amount, &["сума"], true),
        ColumnSpec::header(Role::Description, &["обяснителен текст", "обяснение"], false),
    ],
    derivation: Derivation::DocumentReference,
    signed_amounts: false,
};

/// Microinvest "контировки" export.
pub const MICROINVEST: TemplateDescriptor = TemplateDescriptor {
    id: TemplateId::Microinvest,
    product: "Микроинвест",
    labels: &[
        &["контиране"],
        &["дебит сметка"],
        &["кредит сметка"],
        &["док. вид"],
        &["док. дата"],
        &["документ №"],
        &["партньор"],
        &["еик/ддс номер"],
        &["основание"],
    ],
    columns: &[
        ColumnSpec::header(Role::OperationDate, &["дата"], true),
        ColumnSpec::header(Role::DebitAccount, &["дебит сметка", "дебит"], true),
        ColumnSpec::header(Role::CreditAccount, &["кредит сметка", "кредит"], true),
        ColumnSpec::header(Role::Amount, &["сума"], true),
        ColumnSpec::header(Role::DocumentType, &["док. вид", "вид"], false),
        ColumnSpec::header(Role::DocumentNumber, &["документ №", "номер"], false),
        ColumnSpec::header(Role::PartnerName, &["партньор"], false),
        ColumnSpec::header(Role::Description, &["основание"], false),
    ],
    derivation: Derivation::Direct,
    signed_amounts: false,
};

/// Business Navigator chronological ledger: every line is an account against
/// its correspondent account, amounts in "сума дебит"/"сума кредит".
pub const BUSINESS_NAVIGATOR: TemplateDescriptor = TemplateDescriptor {
    id: TemplateId::BusinessNavigator,
    product: "Бизнес навигатор",
    labels: &[
        &["документ: тип"],
        &["документ: номер"],
        &["документ: дата"],
        &["счетоводен текст"],
        &["сума дебит"],
        &["сума кредит"],
        &["номер на сметка"],
        &["номер на кор.сметка", "номер на кор. сметка"],
        &["кореспонденция"],
    ],
    columns: &[
        ColumnSpec::header(Role::DocumentType, &["документ: тип", "док тип"], false),
        ColumnSpec::header(Role::DocumentNumber, &["документ: номер", "док номер"], false),
        ColumnSpec::header(Role::OperationDate, &["документ: дата", "док дата"], true),
        ColumnSpec::header(Role::Description, &["счетоводен текст"], false),
        ColumnSpec::header(Role::AccountNumber, &["номер на сметка"], true),
        ColumnSpec::header(Role::AccountName, &["име на сметка"], false),
        ColumnSpec::header(
            Role::CorrespondentNumber,
            &["номер на кор.сметка", "номер на кор. сметка"],
            true,
        ),
        ColumnSpec::header(
            Role::CorrespondentName,
            &["име на кор.сметка", "име на кор. сметка"],
            false,
        ),
        ColumnSpec::header(Role::DebitAmount, &["сума дебит"], true),
        ColumnSpec::header(Role::CreditAmount, &["сума кредит"], true),
        ColumnSpec::header(Role::PartnerName, &["име на дилър", "дилър"], false),
    ],
    derivation: Derivation::Correspondence,
    signed_amounts: true,
};

/// Universum journal. Identified by column positions C, E, F, I, J, K, L, P.
pub const UNIVERSUM: TemplateDescriptor = TemplateDescriptor {
    id: TemplateId::Universum,
    product: "Универсум",
    labels: &[
        &["дата на операция"],
        &["дневник"],
        &["вид на документ"],
        &["дебитна сметка"],
        &["кредитна сметка"],
        &["съдържание на операция"],
    ],
    columns: &[
        ColumnSpec::position(Role::OperationDate, 2, true),
        ColumnSpec::position(Role::DocumentType, 4, false),
        ColumnSpec::position(Role::DocumentNumber, 5, false),
        ColumnSpec::position(Role::DebitAccount, 8, true),
        ColumnSpec::position(Role::CreditAccount, 9, true),
        ColumnSpec::position(Role::Amount, 10, true),
        ColumnSpec::position(Role::Description, 11, false),
        ColumnSpec::position(Role::PartnerName, 15, false),
    ],
    derivation: Derivation::Direct,
    signed_amounts: false,
};
