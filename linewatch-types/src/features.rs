//! The predictor's feature column set.

/// Every snapshot key the predictor model was trained on, in model order.
///
/// The service fills columns missing from a request with zero, so a snapshot
/// does not have to carry all of them.
pub const FEATURE_COLUMNS: [&str; 54] = [
    "Mixer/OpenDumpValve",
    "Mixer/Level",
    "Mixer/Temperature",
    "Mixer/OpenOutlet",
    "Mixer/Fill1On",
    "Mixer/Fill2On",
    "Mixer/Fill3On",
    "Mixer/Fill4On",
    "Mixer/Fill5On",
    "Mixer/TurnMixerOn",
    "Mixer/MixerIsOn",
    "Mixer/InFlowMix",
    "Mixer/OutFlowMix",
    "Pasteurizer/OpenDumpValve",
    "Pasteurizer/Level",
    "Pasteurizer/OpenOutlet",
    "Pasteurizer/HeaterOn",
    "Pasteurizer/Temperature",
    "Pasteurizer/CoolerOn",
    "Pasteurizer/InFlowMix",
    "Pasteurizer/OutFlowMix",
    "Homogenizer/ParticleSize",
    "Homogenizer/HomogenizerOn",
    "Homogenizer/Valve1/InFlowMix",
    "Homogenizer/Valve2/OutFlowMix",
    "AgeingCooling/OpenDumpValve",
    "AgeingCooling/Level",
    "AgeingCooling/Temperature",
    "AgeingCooling/InFlowMix",
    "AgeingCooling/OpenOutlet",
    "AgeingCooling/AgeingCoolingOn",
    "AgeingCooling/OutFlowMix",
    "DynamicFreezer/OpenDumpValve",
    "DynamicFreezer/Level",
    "DynamicFreezer/OpenOutlet",
    "DynamicFreezer/HeaterOn",
    "DynamicFreezer/Temperature",
    "DynamicFreezer/SolidFlavoringOn",
    "DynamicFreezer/LiquidFlavoringOn",
    "DynamicFreezer/FreezerOn",
    "DynamicFreezer/DasherOn",
    "DynamicFreezer/Overrun",
    "DynamicFreezer/SendTestValues",
    "DynamicFreezer/ParticleSize",
    "DynamicFreezer/BarrelRotationSpeed",
    "DynamicFreezer/PasteurizationUnits",
    "DynamicFreezer/InFlowMix",
    "DynamicFreezer/OutFlowMix",
    "Hardening/Packages",
    "Hardening/OpenDumpValve",
    "Hardening/Temperature",
    "Hardening/HardeningOn",
    "Hardening/FinishBatchOn",
    "Hardening/InFlowMix",
];
