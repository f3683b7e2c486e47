pub mod country_wizard;
pub mod dashboard_viewmodel;
pub mod login_viewmodel;

pub use country_wizard::{CountryWizard, SubmissionSummary, WizardMode, WizardStep};
pub use dashboard_viewmodel::{CountryRow, DashboardViewModel, DeleteDialog, RouteDecision};
pub use login_viewmodel::{LoginFormErrors, LoginViewModel};
