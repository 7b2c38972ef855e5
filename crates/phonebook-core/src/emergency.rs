//! Public emergency numbers listed next to the directory.

/// A public emergency service and the short number that reaches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmergencyService {
  pub name:   &'static str,
  pub number: &'static str,
}

/// Where the numbers in [`EMERGENCY_SERVICES`] apply.
pub const EMERGENCY_REGION: &str = "UAE";

pub const EMERGENCY_SERVICES: [EmergencyService; 6] = [
  EmergencyService { name: "Police", number: "999" },
  EmergencyService { name: "Ambulance", number: "998" },
  EmergencyService { name: "Civil Defence", number: "997" },
  EmergencyService { name: "Coast Guard", number: "996" },
  EmergencyService { name: "Electricity", number: "991" },
  EmergencyService { name: "Water", number: "992" },
];
