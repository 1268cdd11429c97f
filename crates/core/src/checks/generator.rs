//! Check batch generation.
//!
//! Turns a [`CheckPrintRequest`] into persisted checks and a print file.
//! Everything that writes to the ledger happens inside one
//! [`CheckLedgerScope`]; the only state that survives a failure is what was
//! committed before the scope opened (burned check numbers, a started run,
//! a counted reprint).

use std::collections::HashSet;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use checkrun_shared::{CheckRunId, Ssn};

use super::allocator::CheckNumberAllocator;
use super::demographic::DemographicResolver;
use super::payee::{check_amount, payable_name};
use super::policy::CheckRunPolicy;
use super::request::{CheckPrintRequest, CheckPrintResult, PRINT_FILE_CONTENT_TYPE};
use super::types::{CheckLineItem, Demographic, Distribution, ProfitShareCheck};
use crate::clock::Clock;
use crate::error::CheckRunError;
use crate::ports::{
    CheckLedger, CheckLedgerScope, CheckNumberSequence, DistributionReader, WorkflowStore,
};
use crate::printing::PrintFileRenderer;
use crate::workflow::service::RunWorkflowManager;
use crate::workflow::types::{CheckRunWorkflow, WorkflowMutation, reprint_not_allowed};

/// Validation field for distribution id problems.
pub const DISTRIBUTION_IDS_FIELD: &str = "DistributionIds";

/// External collaborators of the generator.
#[derive(Clone)]
pub struct CheckRunCollaborators {
    /// Shared check number source.
    pub sequence: Arc<dyn CheckNumberSequence>,
    /// Existence checks outside the write scope.
    pub distributions: Arc<dyn DistributionReader>,
    /// Workflow persistence.
    pub workflows: Arc<dyn WorkflowStore>,
    /// Check ledger and its atomic scope.
    pub ledger: Arc<dyn CheckLedger>,
    /// Source of "today".
    pub clock: Arc<dyn Clock>,
}

impl CheckRunCollaborators {
    /// Uses one store for every collaborator.
    pub fn from_store<S>(store: Arc<S>, clock: Arc<dyn Clock>) -> Self
    where
        S: CheckNumberSequence + DistributionReader + WorkflowStore + CheckLedger + 'static,
    {
        Self {
            sequence: store.clone(),
            distributions: store.clone(),
            workflows: store.clone(),
            ledger: store,
            clock,
        }
    }
}

/// Generates check batches. One instance serves concurrent callers.
#[derive(Clone)]
pub struct CheckBatchGenerator {
    allocator: CheckNumberAllocator,
    workflow: RunWorkflowManager,
    distributions: Arc<dyn DistributionReader>,
    ledger: Arc<dyn CheckLedger>,
    renderer: PrintFileRenderer,
    policy: CheckRunPolicy,
}

fn ensure_active(cancel: &CancellationToken) -> Result<(), CheckRunError> {
    if cancel.is_cancelled() {
        return Err(CheckRunError::Cancelled);
    }
    Ok(())
}

/// Ids from `requested` that are not in `found`, in request order.
fn missing_ids(requested: &[i64], found: impl IntoIterator<Item = i64>) -> Vec<i64> {
    let found: HashSet<i64> = found.into_iter().collect();
    requested
        .iter()
        .copied()
        .filter(|id| !found.contains(id))
        .collect()
}

fn distributions_not_found(missing: &[i64]) -> CheckRunError {
    let ids: Vec<String> = missing.iter().map(ToString::to_string).collect();
    CheckRunError::validation(
        DISTRIBUTION_IDS_FIELD,
        format!(
            "One or more distributions were not found: {}",
            ids.join(", ")
        ),
    )
}

impl CheckBatchGenerator {
    /// Creates a generator with the default print formatters for `policy`.
    #[must_use]
    pub fn new(collaborators: CheckRunCollaborators, policy: CheckRunPolicy) -> Self {
        let renderer = PrintFileRenderer::with_routing_number(&policy.bank_routing_number);
        Self::with_renderer(collaborators, policy, renderer)
    }

    /// Creates a generator with custom print formatters.
    #[must_use]
    pub fn with_renderer(
        collaborators: CheckRunCollaborators,
        policy: CheckRunPolicy,
        renderer: PrintFileRenderer,
    ) -> Self {
        Self {
            allocator: CheckNumberAllocator::new(collaborators.sequence),
            workflow: RunWorkflowManager::new(
                collaborators.workflows,
                collaborators.clock,
                policy.max_reprint_count,
            ),
            distributions: collaborators.distributions,
            ledger: collaborators.ledger,
            renderer,
            policy,
        }
    }

    /// The workflow manager this generator drives.
    #[must_use]
    pub fn workflow(&self) -> &RunWorkflowManager {
        &self.workflow
    }

    /// Prints (or reprints) checks for the requested distributions.
    ///
    /// # Errors
    ///
    /// - Validation failure on `DistributionIds` when no usable id remains or
    ///   any requested distribution does not exist.
    /// - [`CheckRunError::Unexpected`] when check numbers cannot be allocated.
    /// - [`CheckRunError::RunAlreadyActive`] for a fresh run while another is
    ///   active for the year.
    /// - [`CheckRunError::NotFound`] for a reprint with no active run.
    /// - Validation failure on `IsReprint` when the run cannot be reprinted.
    /// - Validation failure on `Demographics` when a payee has no identity.
    /// - [`CheckRunError::Cancelled`] when `cancel` fires.
    #[tracing::instrument(
        skip_all,
        fields(
            profit_year = request.profit_year,
            is_reprint = request.is_reprint,
            printer_type = %request.printer_type,
        )
    )]
    pub async fn generate(
        &self,
        request: &CheckPrintRequest,
        cancel: &CancellationToken,
    ) -> Result<CheckPrintResult, CheckRunError> {
        let ids = request.normalized_distribution_ids();
        if ids.is_empty() {
            return Err(CheckRunError::validation(
                DISTRIBUTION_IDS_FIELD,
                "DistributionIds must contain at least one id.",
            ));
        }

        ensure_active(cancel)?;
        let existing = self.distributions.find_existing_ids(&ids).await?;
        let missing = missing_ids(&ids, existing);
        if !missing.is_empty() {
            warn!(missing = ?missing, "Requested distributions not found");
            return Err(distributions_not_found(&missing));
        }

        ensure_active(cancel)?;
        let check_numbers = self.allocator.allocate_batch(ids.len()).await?;
        let starting_check_number = check_numbers[0];

        ensure_active(cancel)?;
        let run = if request.is_reprint {
            self.prepare_reprint(request).await?
        } else {
            self.workflow
                .start_new_run(
                    request.profit_year,
                    request.check_run_date,
                    starting_check_number,
                    &request.user_name,
                )
                .await?
        };

        ensure_active(cancel)?;
        let items = self
            .issue_checks(request, run.id, &ids, &check_numbers, cancel)
            .await?;

        let content = self.renderer.render(request.printer_type, &items);

        info!(
            run_id = %run.id,
            check_count = items.len(),
            starting_check_number,
            "Generated check print file"
        );

        Ok(CheckPrintResult {
            run_id: run.id,
            file_name: request.printer_type.file_name().to_string(),
            content_type: PRINT_FILE_CONTENT_TYPE.to_string(),
            content,
            check_count: items.len(),
        })
    }

    /// Finds the active run, checks eligibility and counts the reprint.
    ///
    /// The early check gives a clean refusal; the count itself goes through
    /// [`RunWorkflowManager::consume_reprint`], which re-checks under the
    /// store's lock.
    async fn prepare_reprint(
        &self,
        request: &CheckPrintRequest,
    ) -> Result<CheckRunWorkflow, CheckRunError> {
        let current = self.workflow.get_current_run(request.profit_year).await?;

        if !self.workflow.can_reprint(current.id).await? {
            warn!(run_id = %current.id, "Reprint rejected");
            return Err(reprint_not_allowed());
        }

        self.workflow
            .consume_reprint(current.id, &request.user_name)
            .await
    }

    /// Runs the write half of generation inside one ledger scope.
    async fn issue_checks(
        &self,
        request: &CheckPrintRequest,
        run_id: CheckRunId,
        ids: &[i64],
        check_numbers: &[i64],
        cancel: &CancellationToken,
    ) -> Result<Vec<CheckLineItem>, CheckRunError> {
        let mut scope: Box<dyn CheckLedgerScope> = self.ledger.begin().await?;

        if request.is_reprint {
            // Run row lock first: concurrent reprints of one run void in
            // commit order.
            let mutation = WorkflowMutation::RestartCheckNumber {
                check_number: check_numbers[0],
                user: request.user_name.clone(),
            };
            scope
                .modify_run(run_id, mutation, self.workflow.now())
                .await?
                .ok_or_else(|| {
                    CheckRunError::NotFound(format!("Check run workflow {run_id} not found"))
                })?;

            let voided = scope
                .void_active_checks(run_id, request.check_run_date)
                .await?;
            info!(%run_id, voided, "Voided previous checks for reprint");
        }

        ensure_active(cancel)?;
        let mut distributions = scope.load_distributions(ids).await?;
        if distributions.len() != ids.len() {
            let missing = missing_ids(ids, distributions.iter().map(|d| d.id));
            warn!(missing = ?missing, "Distributions disappeared during check run");
            return Err(distributions_not_found(&missing));
        }

        ensure_active(cancel)?;
        let ssns: Vec<Ssn> = distributions.iter().map(|d| d.ssn).collect();
        let demographics =
            DemographicResolver::resolve_current(scope.demographics(), &ssns).await?;

        distributions.sort_by_key(|d| d.id);

        let mut checks = Vec::with_capacity(distributions.len());
        let mut items = Vec::with_capacity(distributions.len());
        for (distribution, &check_number) in distributions.iter().zip(check_numbers) {
            let Some(demographic) = demographics.get(&distribution.ssn) else {
                return Err(CheckRunError::Unexpected(format!(
                    "No identity resolved for distribution {}",
                    distribution.id
                )));
            };
            let (check, item) =
                self.build_check(request, run_id, distribution, check_number, demographic);
            checks.push(check);
            items.push(item);
        }

        ensure_active(cancel)?;
        scope.insert_checks(checks).await?;
        scope.commit().await?;

        debug!(%run_id, count = items.len(), "Persisted checks");
        Ok(items)
    }

    fn build_check(
        &self,
        request: &CheckPrintRequest,
        run_id: CheckRunId,
        distribution: &Distribution,
        check_number: i64,
        demographic: &Demographic,
    ) -> (ProfitShareCheck, CheckLineItem) {
        let name = payable_name(distribution, &self.policy);
        if name.defaulted {
            warn!(
                distribution_id = distribution.id,
                "PayableName was blank; defaulting to placeholder"
            );
        }
        if let Some(length) = name.truncated_from {
            warn!(
                distribution_id = distribution.id,
                length, "PayableName exceeds max length; truncating"
            );
        }

        let amount = check_amount(distribution);

        let check = ProfitShareCheck {
            check_number,
            check_run_workflow_id: run_id,
            ssn: distribution.ssn,
            demographic_id: demographic.id,
            payable_name: name.value.clone(),
            check_amount: amount,
            tax_code_id: distribution.tax_code_id.clone(),
            check_date: request.check_run_date,
            check_run_date: request.check_run_date,
            is_voided: false,
            void_date: None,
            bank_reference_id: check_number,
        };

        let item = CheckLineItem {
            check_number,
            amount,
            recipient_name: name.value,
            ssn: distribution.ssn.to_fixed_width(),
            badge_number: demographic.badge_number,
            issue_date: request.check_run_date,
        };

        (check, item)
    }
}
