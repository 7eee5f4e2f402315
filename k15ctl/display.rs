//! Fixed-width rendering of CPU and northbridge P-state tables

use std::fmt::Write;

use crate::column_enum;
use crate::pstate::{CpuSlotReport, CpuUpdate, NbSlotReport, NbUpdate};

const LABEL_WIDTH: usize = 17;

column_enum! {
    pub enum CpuColumn {
        CpuFid => "CpuFid", 8,
        CpuDid => "CpuDid", 8,
        CpuVid => "CpuVid", 8,
        NbPstate => "NbPstate", 8,
        CpuFreq => "CpuFreq", 12,
        UCpu => "UCpu", 11,
        PCore => "PCore", 13,
    }
}

column_enum! {
    pub enum NbColumn {
        NbFid => "NbFid", 8,
        NbDid => "NbDid", 8,
        NbVid => "NbVid", 8,
        NbFreq => "NbFreq", 12,
        UNb => "UNb", 11,
    }
}

fn header(out: &mut String, columns: impl Iterator<Item = (&'static str, usize)>) {
    let _ = write!(out, "{:LABEL_WIDTH$}", "");
    for (name, width) in columns {
        let _ = write!(out, " {name:>width$}");
    }
    out.push('\n');
}

/// Render the P-state table of one core
pub fn render_cpu_table(core: u32, reports: &[CpuSlotReport]) -> String {
    let mut out = format!("CPU{core}\n");
    header(
        &mut out,
        CpuColumn::all().iter().map(|c| (c.name(), c.width())),
    );

    for report in reports {
        let _ = write!(out, "{:>LABEL_WIDTH$}", report.label.to_string());
        let def = &report.register.layout;
        if def.pstate_en {
            let q = &report.quantities;
            let _ = writeln!(
                out,
                " {:>8} {:>8} {:>8} {:>8} {:>8} MHz {:>8.1} mV {:>10.2} mW",
                def.cpu_fid,
                def.cpu_did,
                def.cpu_vid,
                def.nb_pstate,
                q.core_clock_mhz,
                q.voltage_mv,
                q.power_mw
            );
        } else {
            let _ = writeln!(out, " {:>8}", "unused");
        }
    }

    out
}

/// Render the P-state table of one northbridge
pub fn render_nb_table(node: u32, reports: &[NbSlotReport]) -> String {
    let mut out = format!("Northbridge {node}\n");
    header(
        &mut out,
        NbColumn::all().iter().map(|c| (c.name(), c.width())),
    );

    for report in reports {
        let _ = write!(out, "{:>LABEL_WIDTH$}", report.label.to_string());
        let def = &report.register.layout;
        if def.nb_pstate_en {
            let q = &report.quantities;
            let _ = writeln!(
                out,
                " {:>8} {:>8} {:>8} {:>8} MHz {:>8.1} mV",
                def.nb_fid, def.nb_did, def.nb_vid, q.nb_clock_mhz, q.voltage_mv
            );
        } else {
            let _ = writeln!(out, " {:>8}", "unused");
        }
    }

    out
}

/// Substitute a previewed candidate into the table it came from
pub fn with_cpu_candidate(mut reports: Vec<CpuSlotReport>, update: &CpuUpdate) -> Vec<CpuSlotReport> {
    if let Some(row) = reports.get_mut(update.slot) {
        *row = update.candidate;
    }
    reports
}

pub fn with_nb_candidate(mut reports: Vec<NbSlotReport>, update: &NbUpdate) -> Vec<NbSlotReport> {
    if let Some(row) = reports.get_mut(usize::from(update.slot)) {
        *row = update.candidate;
    }
    reports
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pstate::SlotLabel;
    use k15ctl_raw::current_arch::nb::NbPStateDef;
    use k15ctl_raw::current_arch::pstate::PStateDef;
    use k15ctl_raw::Register;

    fn cpu_row(label: SlotLabel, slot: u64, def: PStateDef) -> CpuSlotReport {
        CpuSlotReport::new(label, Register::new(0xC001_0064 + slot, def))
    }

    #[test]
    fn test_cpu_table_layout() {
        let p0 = PStateDef {
            cpu_fid: 16,
            cpu_vid: 22,
            idd_value: 137,
            idd_div: 1,
            pstate_en: true,
            ..Default::default()
        };
        let reports = vec![
            cpu_row(SlotLabel::Boosted(0), 0, p0),
            cpu_row(SlotLabel::Ordinary(0), 1, PStateDef::default()),
        ];

        let table = render_cpu_table(3, &reports);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines[0], "CPU3");
        assert!(lines[1].contains("CpuFid") && lines[1].ends_with("PCore"));
        assert_eq!(
            lines[2],
            "Boosted P-State 0       16        0       22        0     3200 MHz   1275.0 mV   17467.50 mW"
        );
        assert_eq!(lines[3], "        P-State 0   unused");
        assert_eq!(lines[1].len(), lines[2].len());
    }

    #[test]
    fn test_nb_table_layout() {
        let nb0 = NbPStateDef {
            nb_pstate_en: true,
            nb_fid: 22,
            nb_did: 0,
            nb_vid: 46,
            reserved: 0,
        };
        let reports = vec![
            NbSlotReport::new(0, Register::new(0x160, nb0)),
            NbSlotReport::new(1, Register::new(0x164, NbPStateDef::default())),
        ];

        let table = render_nb_table(0, &reports);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines[0], "Northbridge 0");
        assert!(lines[2].starts_with("     NB P-State 0"));
        assert!(lines[2].contains("5200 MHz"));
        assert!(lines[2].ends_with("975.0 mV"));
        assert!(lines[3].ends_with("unused"));
    }

    #[test]
    fn test_candidate_substitution() {
        let reports = vec![
            cpu_row(SlotLabel::Ordinary(0), 0, PStateDef::default()),
            cpu_row(SlotLabel::Ordinary(1), 1, PStateDef::default()),
        ];
        let candidate = cpu_row(
            SlotLabel::Ordinary(1),
            1,
            PStateDef {
                cpu_fid: 22,
                pstate_en: true,
                ..Default::default()
            },
        );
        let update = CpuUpdate {
            core: 0,
            slot: 1,
            original: reports[1].register,
            candidate,
            warnings: Vec::new(),
            committed: false,
        };

        let merged = with_cpu_candidate(reports.clone(), &update);
        assert_eq!(merged[0], reports[0]);
        assert_eq!(merged[1], candidate);
    }

    #[test]
    fn test_column_names() {
        assert_eq!(CpuColumn::all().len(), 7);
        assert_eq!(CpuColumn::PCore.name(), "PCore");
        assert_eq!(NbColumn::all()[3].name(), "NbFreq");
        assert_eq!(CpuColumn::CpuFreq.width(), 12);
    }
}
